use std::sync::OnceLock;

use regex::Regex;

/// Expand `${VAR}` placeholders in a raw TOML string before parsing
///
/// `${VAR:-fallback}` substitutes the fallback when the variable is unset.
/// A bare `${VAR}` with no fallback is an error when the variable is unset,
/// so misconfigured deployments fail at startup rather than at request time.
pub(crate) fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid placeholder regex")
        })
    }

    let mut output = String::with_capacity(input.len());
    let mut last_end = 0;

    for captures in placeholder().captures_iter(input) {
        let overall = captures.get(0).expect("capture 0 always present");
        let var_name = captures.get(1).expect("variable name group").as_str();
        let fallback = captures.get(2).map(|m| m.as_str());

        output.push_str(&input[last_end..overall.start()]);

        match std::env::var(var_name) {
            Ok(value) => output.push_str(&value),
            Err(_) => match fallback {
                Some(fallback) => output.push_str(fallback),
                None => return Err(format!("environment variable not set: `{var_name}`")),
            },
        }

        last_end = overall.end();
    }

    output.push_str(&input[last_end..]);

    Ok(output)
}
