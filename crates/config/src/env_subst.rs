/// Replace `${VAR}` and `${VAR:-fallback}` placeholders in raw config text.
///
/// Unset variables without a fallback keep their placeholder verbatim.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "YOUTUBE_API_KEY" => Some("AIza-123".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("api_key = \"${YOUTUBE_API_KEY}\"", lookup),
            "api_key = \"AIza-123\""
        );
    }

    #[test]
    fn unknown_var_is_kept() {
        assert_eq!(
            substitute_env_with("${STREAMCHAT_MISSING}", lookup),
            "${STREAMCHAT_MISSING}"
        );
    }

    #[test]
    fn fallback_used_when_unset() {
        assert_eq!(
            substitute_env_with("limit = ${STREAMCHAT_LIMIT:-30}", lookup),
            "limit = 30"
        );
    }

    #[test]
    fn set_but_empty_var_wins_over_fallback() {
        assert_eq!(substitute_env_with("[${EMPTY:-x}]", lookup), "[]");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env_with("a ${OPEN", lookup), "a ${OPEN");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
