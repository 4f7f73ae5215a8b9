mod cli;
mod config;
mod contacts;
mod logging;
mod mailer;
mod message;
mod send_log;
mod template;
mod units;
mod utils;

pub use cli::{Cli, LogLevel};
pub use config::Config;
pub use contacts::{Contact, Contacts};
pub use logging::init_logging;
pub use mailer::{Mailer, SmtpMailer};
pub use message::build_message;
pub use send_log::{read_records, LogRecord, SendLog, SendReport, SendStatus, Timestamp};
pub use template::Template;
pub use units::Port;

use std::io::Write;

use anyhow::Context;
use lettre::message::Mailbox;
use log::{debug, error, info, warn};

pub fn run(cli: Cli) -> anyhow::Result<SendReport> {
    let config = Config::load(&cli.get_config_path()).context("Failed to load config")?;
    let contacts =
        Contacts::load_from(&cli.get_contacts_path()).context("Failed to load contacts")?;
    let from = check_inputs(&config, &contacts)?;

    let mut mailer = SmtpMailer::connect(&config)?;
    let mut send_log = SendLog::create(&cli.get_send_log_path())?;

    let report = send_all(&config, &from, &contacts, &mut mailer, &mut send_log)?;
    info!("Completed. {report}");
    Ok(report)
}

/// Everything that must hold before connecting, returns the sender mailbox
///
/// An empty contacts file has no header row, so the column check only
/// applies when there is someone to send to.
fn check_inputs(config: &Config, contacts: &Contacts) -> anyhow::Result<Mailbox> {
    if contacts.is_empty() {
        warn!("No contacts to send to");
    } else {
        config.check_placeholders(contacts.columns())?;
    }
    config.sender()
}

/// Sends to every contact in order, recording one log row each
///
/// Send failures are recorded and processing continues, only errors writing
/// the log abort the run.
pub fn send_all<M: Mailer, W: Write>(
    config: &Config,
    from: &Mailbox,
    contacts: &Contacts,
    mailer: &mut M,
    send_log: &mut SendLog<W>,
) -> anyhow::Result<SendReport> {
    debug!("Sending to {} contacts", contacts.len());
    let mut report = SendReport::default();
    for contact in contacts.iter() {
        let record = match contact.email() {
            None => {
                warn!("Skipping contact with missing email: {contact}");
                LogRecord::skipped()
            }
            Some(address) => {
                match build_message(config, from, contact, address)
                    .and_then(|message| mailer.send(&message))
                {
                    Ok(()) => {
                        info!("Sent email to {address}");
                        LogRecord::sent(address)
                    }
                    Err(e) => {
                        error!("Failed to send to {address}: {e:#}");
                        LogRecord::failed(address, &format!("{e:#}"))
                    }
                }
            }
        };
        report.add(record.status);
        send_log.record(&record)?;
    }
    Ok(report)
}
