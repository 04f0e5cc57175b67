//! A miniature copy of the archive's page layout served by wiremock.

use std::io::{Cursor, Write};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const ROOT_PATH: &str = "/science/B/whalesounds/masterFiles.cfm";
pub const SPECIES_PATH: &str = "/science/B/whalesounds/bestOf.cfm";
pub const YEAR_PATH: &str = "/science/B/whalesounds/yearFiles.cfm";

/// Root page with a species dropdown; `species` is (label, code).
pub fn root_page(species: &[(&str, &str)]) -> String {
    let options: String = species
        .iter()
        .map(|(label, code)| format!(r#"<option value="{SPECIES_PATH}?code={code}">{label}</option>"#))
        .collect();
    format!(
        r#"<html><body>
          <div class="large-4 medium-4 columns left">
            <select name="species">
              <option value="">Select a species</option>
              {options}
            </select>
          </div>
        </body></html>"#
    )
}

/// Species page with a year dropdown and a file table; `years` is (label, code).
pub fn species_page(code: &str, years: &[&str], files: &[&str]) -> String {
    let options: String = years
        .iter()
        .map(|year| format!(r#"<option value="yearFiles.cfm?SP={code}&amp;YR={year}">{year}</option>"#))
        .collect();
    format!(
        r#"<html><body>
          <div class="large-4 medium-4 columns">
            <select name="year">
              <option value="">Select a year</option>
              {options}
            </select>
          </div>
          {table}
        </body></html>"#,
        table = file_table(files)
    )
}

/// Year page listing `files`.
pub fn year_page(files: &[&str]) -> String {
    format!("<html><body>{}</body></html>", file_table(files))
}

fn file_table(files: &[&str]) -> String {
    let rows: String = files
        .iter()
        .map(|href| format!(r#"<tr><td><a href="{href}">{href}</a></td><td>1975</td></tr>"#))
        .collect();
    format!(r#"<table class="database"><tr><th>File</th><th>Year</th></tr>{rows}</table>"#)
}

/// In-memory zip archive with the given entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub async fn mount_root(server: &MockServer, html: String) {
    Mock::given(method("GET"))
        .and(path(ROOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

pub async fn mount_species(server: &MockServer, code: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(SPECIES_PATH))
        .and(query_param("code", code))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

pub async fn mount_year(server: &MockServer, code: &str, year: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(YEAR_PATH))
        .and(query_param("SP", code))
        .and(query_param("YR", year))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, file_path: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, file_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn root_url(server: &MockServer) -> String {
    format!("{}{ROOT_PATH}", server.uri())
}
