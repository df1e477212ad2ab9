//! Activation email templates.
//!
//! Templates use `{name}` placeholders:
//! - `{site}`: the site identifier (subject and body)
//! - `{activation_key}`: the issued token (body)
//! - `{expiration_days}`: the activation window in days (body)

use serde::{Deserialize, Serialize};

const DEFAULT_SUBJECT: &str = "Activate your account at {site}";

const DEFAULT_BODY: &str = "\
Someone, hopefully you, signed up for a new account at {site} using this
email address. If it was you, and you'd like to activate and use your
account, use the activation key below within {expiration_days} days.

{activation_key}

If it wasn't you, you don't need to do anything; the account will be
removed automatically once the key expires.
";

/// Subject and body templates for the activation email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivationTemplates {
    pub subject: String,
    pub body: String,
}

impl Default for ActivationTemplates {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

/// Values substituted into the templates.
#[derive(Debug, Clone, Copy)]
pub struct ActivationContext<'a> {
    pub site: &'a str,
    pub activation_key: &'a str,
    pub expiration_days: u32,
}

impl ActivationTemplates {
    /// Renders the subject, joining any line breaks into a single line.
    #[must_use]
    pub fn render_subject(&self, ctx: &ActivationContext<'_>) -> String {
        substitute(&self.subject, ctx).lines().collect()
    }

    /// Renders the body.
    #[must_use]
    pub fn render_body(&self, ctx: &ActivationContext<'_>) -> String {
        substitute(&self.body, ctx)
    }
}

/// Expands placeholders in one left-to-right pass. Substituted values are
/// never rescanned, and unknown `{...}` sequences are copied through.
fn substitute(template: &str, ctx: &ActivationContext<'_>) -> String {
    let days = ctx.expiration_days.to_string();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| match &tail[1..close] {
            "site" => Some((ctx.site, close)),
            "activation_key" => Some((ctx.activation_key, close)),
            "expiration_days" => Some((days.as_str(), close)),
            _ => None,
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ActivationContext<'static> {
        ActivationContext {
            site: "example.com",
            activation_key: "0123456789abcdef0123456789abcdef01234567",
            expiration_days: 7,
        }
    }

    #[test]
    fn default_body_carries_all_values() {
        let body = ActivationTemplates::default().render_body(&ctx());
        assert!(body.contains("example.com"));
        assert!(body.contains("0123456789abcdef0123456789abcdef01234567"));
        assert!(body.contains("within 7 days"));
    }

    #[test]
    fn subject_is_joined_to_one_line() {
        let templates = ActivationTemplates {
            subject: "Welcome\nto {site}\r\n".into(),
            body: String::new(),
        };
        assert_eq!(templates.render_subject(&ctx()), "Welcometo example.com");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let templates = ActivationTemplates {
            subject: String::new(),
            body: "{site} / {expiration_days}".into(),
        };
        let ctx = ActivationContext {
            site: "{activation_key}{expiration_days}",
            ..ctx()
        };
        assert_eq!(
            templates.render_body(&ctx),
            "{activation_key}{expiration_days} / 7"
        );
    }

    #[test]
    fn stray_braces_are_copied_through() {
        let templates = ActivationTemplates {
            subject: "{ {{site}} }".into(),
            body: String::new(),
        };
        assert_eq!(templates.render_subject(&ctx()), "{ {example.com} }");
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let templates = ActivationTemplates {
            subject: "{nope} {site}".into(),
            body: String::new(),
        };
        assert_eq!(templates.render_subject(&ctx()), "{nope} example.com");
    }
}
