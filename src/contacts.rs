use std::{collections::BTreeMap, fmt::Display, fs::File, io::Read, path::Path};

use anyhow::Context;
use csv::ReaderBuilder;
use log::debug;

/// Name of the column holding the recipient address
pub const EMAIL_COLUMN: &str = "email";

/// One row of the contacts file keyed by column name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Contact {
    fields: BTreeMap<String, String>,
}

impl Contact {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// The trimmed recipient address, `None` if the column is missing or blank
    pub fn email(&self) -> Option<&str> {
        self.get(EMAIL_COLUMN)
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

impl FromIterator<(String, String)> for Contact {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.fields)
    }
}

#[derive(Debug, Default)]
pub struct Contacts {
    columns: Vec<String>,
    rows: Vec<Contact>,
}

impl Contacts {
    pub fn load_from(contacts_path: &Path) -> anyhow::Result<Self> {
        debug!("Loading contacts from: {contacts_path:?}");
        let file = File::open(contacts_path)
            .with_context(|| format!("Failed to open contacts file {contacts_path:?}"))?;
        let result = Self::from_reader(file)
            .with_context(|| format!("Failed to parse contacts file {contacts_path:?}"))?;
        debug!(
            "Loaded {} contacts with columns {:?}",
            result.len(),
            result.columns
        );
        Ok(result)
    }

    /// Reads a headed CSV. Short rows lack the trailing columns, extra fields are dropped.
    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader
            .headers()
            .context("Failed to read header row")?
            .iter()
            .map(|column| column.to_string())
            .collect();

        let mut rows: Vec<Contact> = vec![];
        for (i, record) in reader.records().enumerate() {
            // +2 as the header is line 1
            let record = record.with_context(|| format!("Failed to read row {}", i + 2))?;
            rows.push(
                columns
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect(),
            );
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_rows_by_header() {
        // Arrange
        let input = "name,email,company\nAda,ada@example.com,Engines\nBob,bob@example.com,\n";

        // Act
        let actual = Contacts::from_reader(input.as_bytes()).unwrap();

        // Assert
        assert_eq!(actual.columns(), ["name", "email", "company"]);
        assert_eq!(actual.len(), 2);
        let rows: Vec<&Contact> = actual.iter().collect();
        assert_eq!(rows[0].get("name"), Some("Ada"));
        assert_eq!(rows[0].email(), Some("ada@example.com"));
        assert_eq!(rows[1].get("company"), Some(""));
    }

    #[test]
    fn quoted_fields() {
        let input = "name,email\n\"Lovelace, Ada\",ada@example.com\n";
        let actual = Contacts::from_reader(input.as_bytes()).unwrap();
        let row = actual.iter().next().unwrap();
        assert_eq!(row.get("name"), Some("Lovelace, Ada"));
    }

    #[test]
    fn email_is_trimmed_and_blank_is_none() {
        let input = "name,email\nAda,  ada@example.com \nBob,   \n";
        let actual = Contacts::from_reader(input.as_bytes()).unwrap();
        let emails: Vec<Option<&str>> = actual.iter().map(Contact::email).collect();
        assert_eq!(emails, vec![Some("ada@example.com"), None]);
    }

    #[test]
    fn missing_email_column() {
        let input = "name\nAda\n";
        let actual = Contacts::from_reader(input.as_bytes()).unwrap();
        assert_eq!(actual.iter().next().unwrap().email(), None);
    }

    #[test]
    fn short_and_long_rows() {
        let input = "name,email,company\nAda\nBob,bob@example.com,Acme,extra\n";
        let actual = Contacts::from_reader(input.as_bytes()).unwrap();
        let rows: Vec<&Contact> = actual.iter().collect();
        assert_eq!(rows[0].get("name"), Some("Ada"));
        assert_eq!(rows[0].get("email"), None);
        assert_eq!(rows[1].get("company"), Some("Acme"));
        assert_eq!(rows[1].get("extra"), None);
    }

    #[test]
    fn header_only_is_empty() {
        let actual = Contacts::from_reader("name,email\n".as_bytes()).unwrap();
        assert!(actual.is_empty());
        assert_eq!(actual.columns(), ["name", "email"]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "email,name").unwrap();
        writeln!(file, "ada@example.com,Ada").unwrap();

        let actual = Contacts::load_from(file.path()).unwrap();

        assert_eq!(actual.len(), 1);
    }

    #[test]
    fn load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Contacts::load_from(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("nope.csv"), "{err}");
    }
}
