//! Spreadsheet exports of lists, tallies and elector records.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use rocket::{
    http::{ContentType, Header},
    response::{self, Responder},
    Request, Response,
};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::Result;
use crate::model::api::{
    candidate_list::CandidateListDescription, elector::ElectorDescription,
};

pub const ALL_LISTS_SHEET: &str = "CandidateLists";
pub const ELECTORS_SHEET: &str = "Electors";

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// A finished `.xlsx` document, sent as a download.
#[derive(Debug)]
pub struct Spreadsheet {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for Spreadsheet {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let disposition = content_disposition(&self.filename);
        Response::build()
            .header(ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ))
            .header(Header::new("Content-Disposition", disposition))
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}

enum Cell {
    Text(String),
    Number(f64),
}

/// Write a single sheet with a bold header row followed by `rows`.
fn single_sheet(name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(name))?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (row, cells) in rows.into_iter().enumerate() {
        let row = row as u32 + 1;
        for (col, cell) in cells.into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col, text)?,
                Cell::Number(number) => worksheet.write_number(row, col, number)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// One list's candidates, on a sheet named after the list.
pub fn candidate_list_sheet(list: &CandidateListDescription) -> Result<Vec<u8>> {
    let rows = list
        .candidates
        .iter()
        .map(|c| {
            vec![
                Cell::Text(c.name.clone()),
                Cell::Text(c.party.clone()),
                Cell::Number(c.votes.into()),
            ]
        })
        .collect();
    single_sheet(&list.name, &["Candidate Name", "Party", "Votes"], rows)
}

/// Every candidate of every list, flattened into one table.
pub fn all_lists_sheet(lists: &[CandidateListDescription]) -> Result<Vec<u8>> {
    let rows = lists
        .iter()
        .flat_map(|list| {
            list.candidates.iter().map(move |c| {
                vec![
                    Cell::Text(list.name.clone()),
                    Cell::Number(list.list_votes.into()),
                    Cell::Text(c.name.clone()),
                    Cell::Text(c.party.clone()),
                    Cell::Number(c.votes.into()),
                ]
            })
        })
        .collect();
    single_sheet(
        ALL_LISTS_SHEET,
        &[
            "List Name",
            "List Votes",
            "Candidate Name",
            "Party",
            "Candidate Votes",
        ],
        rows,
    )
}

/// A voter's elector records.
pub fn electors_sheet(electors: &[ElectorDescription]) -> Result<Vec<u8>> {
    let rows = electors
        .iter()
        .map(|e| {
            vec![
                Cell::Number(e.elector_id.into()),
                Cell::Text(e.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ]
        })
        .collect();
    single_sheet(ELECTORS_SHEET, &["Elector ID", "Submitted At"], rows)
}

/// Where the elector snapshot of the given voter is kept.
pub fn snapshot_path(export_dir: &Path, username: &str) -> PathBuf {
    export_dir.join(format!("electors_{}.xlsx", file_safe(username)))
}

/// Excel sheet names are at most 31 characters and may not contain `[]:*?/\`.
pub fn sheet_name(raw: &str) -> String {
    let cleaned = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect::<String>();
    // Truncate before trimming, a cut can expose an apostrophe at the end.
    let truncated = cleaned.chars().take(MAX_SHEET_NAME).collect::<String>();
    let trimmed = truncated.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Content-Disposition` for a download: an ASCII `filename` for old clients
/// and the exact UTF-8 name as `filename*` (RFC 6266).
fn content_disposition(filename: &str) -> String {
    let safe = file_safe(filename);
    let ascii = safe
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect::<String>();
    format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        percent_encode(&safe)
    )
}

/// Percent-encode everything outside the RFC 5987 `attr-char` set.
fn percent_encode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Replace anything that is not safe in a file name or header value.
fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
