//! Voice-command detection.
//!
//! [`detect_command`] scans an accumulated final transcript for the two fixed
//! trigger sets — "add this to the cart" and "show me the cart" — and
//! classifies the utterance into a [`VoiceCommand`].
//!
//! The detector is a pure function over the FULL transcript, not the newest
//! increment, so a trigger word spoken anywhere in the utterance is caught.
//! Korean trigger variants are included alongside their English equivalents
//! because the recognition engine may emit either depending on the language
//! tag in use.

// ---------------------------------------------------------------------------
// VoiceCommand
// ---------------------------------------------------------------------------

/// A recognized voice intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Confirm the displayed product and add it to the cart.
    Add,
    /// Switch to the cart view.
    OpenCart,
}

impl VoiceCommand {
    /// A short human-readable label suitable for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            VoiceCommand::Add => "add",
            VoiceCommand::OpenCart => "open-cart",
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger sets
// ---------------------------------------------------------------------------

/// Phrases that mean confirmation/addition. Checked before the cart set;
/// when both appear in one utterance, Add wins.
const ADD_TRIGGERS: &[&str] = &["add", "애드", "추가", "yes"];

/// Phrases that mean "show the cart".
const CART_TRIGGERS: &[&str] = &["장바구니", "카트", "cart"];

// ---------------------------------------------------------------------------
// detect_command
// ---------------------------------------------------------------------------

/// Scan `text` for trigger phrases and classify it.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Returns
/// `None` when no trigger is present.
///
/// # Example
///
/// ```rust
/// use voice_shop::command::{detect_command, VoiceCommand};
///
/// assert_eq!(detect_command("Add it to my order"), Some(VoiceCommand::Add));
/// assert_eq!(detect_command("show my cart"), Some(VoiceCommand::OpenCart));
/// assert_eq!(detect_command("two ripe avocados"), None);
/// ```
pub fn detect_command(text: &str) -> Option<VoiceCommand> {
    let lower = text.to_lowercase();
    let lower = lower.trim();

    if ADD_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Some(VoiceCommand::Add);
    }
    if CART_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return Some(VoiceCommand::OpenCart);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Add triggers ---

    #[test]
    fn detects_add_anywhere_in_transcript() {
        assert_eq!(
            detect_command("I want to... ADD this"),
            Some(VoiceCommand::Add)
        );
    }

    #[test]
    fn detects_korean_add_variants() {
        assert_eq!(detect_command("추가해 주세요"), Some(VoiceCommand::Add));
        assert_eq!(detect_command("애드 해줘"), Some(VoiceCommand::Add));
    }

    #[test]
    fn detects_yes_as_add() {
        assert_eq!(detect_command("yes please"), Some(VoiceCommand::Add));
    }

    // ---- Cart triggers ---

    #[test]
    fn detects_cart_in_english() {
        assert_eq!(
            detect_command("open the cart"),
            Some(VoiceCommand::OpenCart)
        );
    }

    #[test]
    fn detects_korean_cart_variants() {
        assert_eq!(
            detect_command("show me my 카트"),
            Some(VoiceCommand::OpenCart)
        );
        assert_eq!(
            detect_command("장바구니 보여줘"),
            Some(VoiceCommand::OpenCart)
        );
    }

    // ---- Priority and negatives ---

    #[test]
    fn add_wins_when_both_triggers_present() {
        assert_eq!(
            detect_command("add it then show cart"),
            Some(VoiceCommand::Add)
        );
    }

    #[test]
    fn plain_request_matches_nothing() {
        assert_eq!(detect_command("no thanks"), None);
        assert_eq!(detect_command("broccoli"), None);
    }

    #[test]
    fn empty_and_whitespace_match_nothing() {
        assert_eq!(detect_command(""), None);
        assert_eq!(detect_command("   "), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_command("CART"), Some(VoiceCommand::OpenCart));
        assert_eq!(detect_command("Yes"), Some(VoiceCommand::Add));
    }

    #[test]
    fn detection_is_deterministic() {
        let text = "please add two of those";
        assert_eq!(detect_command(text), detect_command(text));
    }
}
