use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    Address, Message,
};

use crate::{Config, Contact};

/// Builds the personalised plain text message for one contact
pub fn build_message(
    config: &Config,
    from: &Mailbox,
    contact: &Contact,
    to: &str,
) -> anyhow::Result<Message> {
    let subject = config
        .subject_template
        .render(contact)
        .context("Failed to render subject")?;
    let body = config
        .body_template
        .render(contact)
        .context("Failed to render body")?;
    let to: Address = to
        .parse()
        .with_context(|| format!("Invalid recipient address {to:?}"))?;

    Message::builder()
        .from(from.clone())
        .to(Mailbox::new(None, to))
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .context("Failed to build message")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample;

    fn contact(pairs: &[(&str, &str)]) -> Contact {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn builds_personalised_message() {
        // Arrange
        let config = sample();
        let from = config.sender().unwrap();
        let contact = contact(&[
            ("name", "Ada"),
            ("company", "Engines Ltd"),
            ("email", "ada@example.com"),
        ]);

        // Act
        let actual = build_message(&config, &from, &contact, "ada@example.com").unwrap();

        // Assert
        let headers = actual.headers();
        assert_eq!(headers.get_raw("Subject"), Some("Hello Ada"));
        assert_eq!(headers.get_raw("To"), Some("ada@example.com"));
        assert_eq!(
            actual.envelope().to(),
            ["ada@example.com".parse::<Address>().unwrap()]
        );
        assert_eq!(
            actual.envelope().from(),
            Some(&"newsletter@example.com".parse::<Address>().unwrap())
        );
        let formatted = String::from_utf8(actual.formatted()).unwrap();
        assert!(formatted.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(formatted.contains("Welcome to Engines Ltd."), "{formatted}");
    }

    #[test]
    fn invalid_recipient() {
        let config = sample();
        let from = config.sender().unwrap();
        let contact = contact(&[("name", "Ada"), ("company", "X")]);
        let err = build_message(&config, &from, &contact, "not an address").unwrap_err();
        assert!(err.to_string().contains("not an address"), "{err}");
    }

    #[test]
    fn missing_value_fails_render() {
        let config = sample();
        let from = config.sender().unwrap();
        let contact = contact(&[("name", "Ada")]);
        let err = build_message(&config, &from, &contact, "ada@example.com").unwrap_err();
        assert!(format!("{err:#}").contains("{company}"), "{err:#}");
    }
}
