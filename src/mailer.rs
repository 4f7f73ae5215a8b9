use anyhow::{bail, Context};
use lettre::{transport::smtp::authentication::Credentials, Message, SmtpTransport, Transport};
use log::{debug, info};

use crate::Config;

/// Delivers built messages, one call per contact
pub trait Mailer {
    fn send(&mut self, message: &Message) -> anyhow::Result<()>;
}

/// Sends over a single STARTTLS session to the configured relay
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Connects, upgrades with STARTTLS and logs in before returning
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        info!(
            "Connecting to SMTP server {}:{} ...",
            config.smtp_host, config.smtp_port
        );
        let credentials =
            Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .with_context(|| format!("Failed to set up STARTTLS for {:?}", config.smtp_host))?
            .port(config.smtp_port.into())
            .credentials(credentials)
            .build();

        let connected = transport.test_connection().with_context(|| {
            format!(
                "Failed to connect and log in to {}:{}",
                config.smtp_host, config.smtp_port
            )
        })?;
        if !connected {
            bail!(
                "SMTP server {}:{} closed the connection after login",
                config.smtp_host,
                config.smtp_port
            );
        }
        info!("Logged in successfully.");
        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&mut self, message: &Message) -> anyhow::Result<()> {
        let response = self.transport.send(message)?;
        debug!("SMTP response: {:?}", response.code());
        Ok(())
    }
}
