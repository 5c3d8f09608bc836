use directory_protocol::{Channel, Intent};

/// Pure mapping from (explicit intent | free text, channel) to a capability.
///
/// Free text runs through a fixed priority chain; the first matching rule
/// wins and `search` is the universal fallback, so no input is unroutable.
pub struct IntentResolver;

impl IntentResolver {
    #[must_use]
    pub fn resolve(explicit: Option<&str>, message: Option<&str>, channel: Channel) -> Intent {
        if let Some(raw) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
            return Intent::parse(raw).unwrap_or(Intent::Unknown);
        }
        let Some(text) = message else {
            return Intent::Unknown;
        };
        Self::classify(text, channel)
    }

    /// Classify free text. Rule order is the contract: menu tokens > exit >
    /// greeting > segments > member listing > detail/contact > search.
    #[must_use]
    pub fn classify(text: &str, channel: Channel) -> Intent {
        let folded = text.trim().to_lowercase();
        if folded.is_empty() {
            return Intent::Unknown;
        }

        if let Some(intent) = Self::menu_token(&folded, channel) {
            return intent;
        }
        if Self::matches_any(&folded, EXIT_KEYWORDS) {
            return Intent::Goodbye;
        }
        if Self::matches_any(&folded, GREETING_KEYWORDS) {
            return Intent::Welcome;
        }
        if SEGMENT_KEYWORDS.iter().any(|kw| folded.contains(kw)) {
            return Intent::ListSegments;
        }
        if Self::is_member_listing(&folded) {
            return Intent::ListMembers;
        }
        if let Some(intent) = Self::detail_pattern(&folded) {
            return intent;
        }

        Intent::Search
    }

    /// Numeric menu replies are a WhatsApp affordance; plain "menu"/"help"
    /// works everywhere.
    fn menu_token(folded: &str, channel: Channel) -> Option<Intent> {
        if folded == "menu" || folded == "help" {
            return Some(Intent::Explore);
        }
        if channel != Channel::Whatsapp {
            return None;
        }
        match folded {
            "0" => Some(Intent::Explore),
            "1" => Some(Intent::ListSegments),
            "2" => Some(Intent::ListMembers),
            "3" => Some(Intent::Search),
            _ => None,
        }
    }

    fn matches_any(folded: &str, keywords: &[&str]) -> bool {
        let first_word = folded.split_whitespace().next().unwrap_or(folded);
        keywords.iter().any(|kw| folded == *kw || first_word == *kw)
    }

    fn is_member_listing(folded: &str) -> bool {
        folded.starts_with("who ")
            || folded == "who"
            || folded.contains("list members")
            || folded.contains("show members")
            || folded.contains("all members")
            || folded.contains("member list")
    }

    fn detail_pattern(folded: &str) -> Option<Intent> {
        if folded.contains("contact")
            || folded.contains("phone number")
            || folded.contains("vcard")
        {
            return Some(Intent::GetContact);
        }
        if folded.starts_with("about ")
            || folded.contains("tell me about")
            || folded.starts_with("book ")
            || folded.contains("call owner")
            || folded.contains("call the owner")
        {
            return Some(Intent::About);
        }
        None
    }
}

const EXIT_KEYWORDS: &[&str] = &["bye", "goodbye", "exit", "quit", "stop", "end", "done"];

const GREETING_KEYWORDS: &[&str] = &[
    "hi", "hello", "hey", "hola", "start", "good morning", "good afternoon", "good evening",
];

const SEGMENT_KEYWORDS: &[&str] = &[
    "segment", "categories", "category", "industries", "sectors",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(text: &str) -> Intent {
        IntentResolver::classify(text, Channel::Chat)
    }

    #[test]
    fn explicit_intent_wins_over_text() {
        let intent = IntentResolver::resolve(Some("list_segments"), Some("hello"), Channel::Chat);
        assert_eq!(intent, Intent::ListSegments);
    }

    #[test]
    fn unparsable_explicit_intent_is_unknown() {
        let intent = IntentResolver::resolve(Some("frobnicate"), Some("hello"), Channel::Chat);
        assert_eq!(intent, Intent::Unknown);
    }

    #[test]
    fn greetings_and_exits() {
        assert_eq!(classify("Hello there"), Intent::Welcome);
        assert_eq!(classify("hey"), Intent::Welcome);
        assert_eq!(classify("good morning"), Intent::Welcome);
        assert_eq!(classify("bye"), Intent::Goodbye);
        assert_eq!(classify("quit now"), Intent::Goodbye);
    }

    #[test]
    fn exit_outranks_greeting() {
        // "bye" appears first in the chain even when a greeting word follows.
        assert_eq!(classify("bye hello"), Intent::Goodbye);
    }

    #[test]
    fn segment_and_member_listing_patterns() {
        assert_eq!(classify("show me the categories"), Intent::ListSegments);
        assert_eq!(classify("which industries are here"), Intent::ListSegments);
        assert_eq!(classify("who is in the group"), Intent::ListMembers);
        assert_eq!(classify("list members please"), Intent::ListMembers);
    }

    #[test]
    fn detail_and_contact_patterns() {
        assert_eq!(classify("contact details for acme"), Intent::GetContact);
        assert_eq!(classify("tell me about acme"), Intent::About);
        assert_eq!(classify("book a session with acme"), Intent::About);
    }

    #[test]
    fn whatsapp_menu_tokens() {
        assert_eq!(IntentResolver::classify("1", Channel::Whatsapp), Intent::ListSegments);
        assert_eq!(IntentResolver::classify("2", Channel::Whatsapp), Intent::ListMembers);
        assert_eq!(IntentResolver::classify("0", Channel::Whatsapp), Intent::Explore);
        // Digits are not menu tokens on other channels.
        assert_eq!(IntentResolver::classify("1", Channel::Chat), Intent::Search);
        assert_eq!(IntentResolver::classify("menu", Channel::Api), Intent::Explore);
    }

    #[test]
    fn everything_else_routes_to_search() {
        assert_eq!(classify("AI platform"), Intent::Search);
        assert_eq!(classify("plumber near me"), Intent::Search);
        assert_eq!(classify("zzz qqq 123"), Intent::Search);
        assert_eq!(classify("🦀"), Intent::Search);
    }

    #[test]
    fn no_input_at_all_is_unknown() {
        assert_eq!(IntentResolver::resolve(None, None, Channel::Chat), Intent::Unknown);
        assert_eq!(IntentResolver::resolve(Some("  "), None, Channel::Chat), Intent::Unknown);
    }
}
