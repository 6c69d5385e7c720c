//! Text extraction from resume file formats

use crate::error::{Result, ResumeScorerError};
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Self::extract_from_bytes(&bytes).map_err(|e| match e {
            ResumeScorerError::PdfExtraction(msg) => ResumeScorerError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }
}

impl PdfExtractor {
    pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed documents
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }))
        .map_err(|_| ResumeScorerError::PdfExtraction("parser panicked".to_string()))?
        .map_err(|e| ResumeScorerError::PdfExtraction(e.to_string()))?;

        Ok(Self::join_pages(&extracted))
    }

    /// Pages arrive separated by form feeds; blank pages are dropped
    fn join_pages(raw: &str) -> String {
        raw.split('\u{c}')
            .map(str::trim_end)
            .filter(|page| !page.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
        let docx = panic::catch_unwind(AssertUnwindSafe(|| read_docx(bytes)))
            .map_err(|_| ResumeScorerError::DocxExtraction("parser panicked".to_string()))?
            .map_err(|e| ResumeScorerError::DocxExtraction(e.to_string()))?;

        let mut text = String::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(paragraph) => Self::push_paragraph(&mut text, paragraph),
                DocumentChild::Table(table) => Self::push_table(&mut text, table),
                _ => {}
            }
        }

        Ok(text.trim().to_string())
    }

    /// Runs of one paragraph, then a newline
    fn push_paragraph(text: &mut String, paragraph: &Paragraph) {
        Self::push_paragraph_children(text, &paragraph.children);
        text.push('\n');
    }

    fn push_paragraph_children(text: &mut String, children: &[ParagraphChild]) {
        for child in children {
            match child {
                ParagraphChild::Run(run) => Self::push_run(text, run),
                ParagraphChild::Hyperlink(link) => Self::push_paragraph_children(text, &link.children),
                _ => {}
            }
        }
    }

    fn push_run(text: &mut String, run: &Run) {
        for child in &run.children {
            match child {
                RunChild::Text(t) => text.push_str(&t.text),
                RunChild::Tab(_) => text.push('\t'),
                RunChild::Break(_) => text.push('\n'),
                _ => {}
            }
        }
    }

    /// Table cells in reading order, one paragraph per line
    fn push_table(text: &mut String, table: &Table) {
        for row in &table.rows {
            let TableChild::TableRow(row) = row;
            for cell in &row.cells {
                let TableRowChild::TableCell(cell) = cell;
                for content in &cell.children {
                    match content {
                        TableCellContent::Paragraph(paragraph) => Self::push_paragraph(text, paragraph),
                        TableCellContent::Table(inner) => Self::push_table(text, inner),
                        _ => {}
                    }
                }
            }
        }
    }
}

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Self::extract_from_bytes(&bytes).map_err(|e| {
            ResumeScorerError::DocxExtraction(format!(
                "Failed to extract text from DOCX '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Ok(Self::decode_permissive(&bytes))
    }
}

impl PlainTextExtractor {
    /// Decode UTF-8, dropping bytes that do not decode
    pub fn decode_permissive(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect()
    }
}

/// Post-extraction cleanup so line-based section detection keeps working
pub struct TextCleaner {
    glued_upper_header: Regex,
    glued_title_header: Regex,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            glued_upper_header: Regex::new(
                r"([a-z0-9.,;:)\]])(TECHNICAL SKILLS|WORK EXPERIENCE|PROFESSIONAL EXPERIENCE|EXPERIENCE|EDUCATION|SKILLS|PROJECTS|CERTIFICATIONS|SUMMARY)",
            )
            .expect("Invalid header regex"),
            glued_title_header: Regex::new(r"([a-z.,;:)])(Experience|Education|Skills)\b")
                .expect("Invalid header regex"),
        }
    }

    pub fn clean(&self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let split = self.glued_upper_header.replace_all(&normalized, "$1\n$2");
        let split = self.glued_title_header.replace_all(&split, "$1\n$2");
        split.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let raw = "Page one text\u{c}   \n \u{c}Page three text\n";
        assert_eq!(PdfExtractor::join_pages(raw), "Page one text\nPage three text");
    }

    #[test]
    fn test_corrupt_pdf_bytes_error() {
        let result = PdfExtractor::extract_from_bytes(b"%PDF-1.4 this is not really a pdf");
        assert!(result.is_err());
    }

    /// Minimal WordprocessingML package around `body`
    fn docx_bytes(body: &str) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_string(),
            ),
            (
                "word/_rels/document.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#.to_string(),
            ),
            (
                "word/document.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                    body
                ),
            ),
        ];

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_paragraphs_tabs_and_entities() {
        let body = r#"<w:p><w:r><w:t>Skills</w:t></w:r></w:p><w:p><w:r><w:t>Rust</w:t><w:tab/><w:t>C&amp;C++</w:t></w:r></w:p>"#;
        let text = DocxExtractor::extract_from_bytes(&docx_bytes(body)).unwrap();
        assert_eq!(text, "Skills\nRust\tC&C++");
    }

    #[test]
    fn test_docx_numeric_character_references() {
        let body = r#"<w:p><w:r><w:t xml:space="preserve">Jan 2019 &#8211; Dec 2020, Caf&#xE9;</w:t></w:r></w:p>"#;
        let text = DocxExtractor::extract_from_bytes(&docx_bytes(body)).unwrap();
        assert_eq!(text, "Jan 2019 \u{2013} Dec 2020, Caf\u{e9}");
    }

    #[test]
    fn test_docx_rejects_non_zip() {
        assert!(DocxExtractor::extract_from_bytes(b"plain bytes").is_err());
    }

    #[test]
    fn test_permissive_decoding_drops_invalid_bytes() {
        let bytes = [b'R', b'u', 0xff, b's', b't'];
        assert_eq!(PlainTextExtractor::decode_permissive(&bytes), "Rust");
    }

    #[test]
    fn test_clean_text_normalizes_line_endings() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_clean_text_splits_glued_headers() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("Jane Doe, BerlinEXPERIENCE\nAcme Corp 2019. SKILLS\npython.EDUCATION");
        assert!(cleaned.contains("Berlin\nEXPERIENCE"));
        assert!(cleaned.contains("python.\nEDUCATION"));
        assert!(cleaned.contains("2019. SKILLS"));

        let title = cleaner.clean("Worked on pipelinesSkills: Rust");
        assert!(title.contains("pipelines\nSkills"));
    }

    #[test]
    fn test_clean_text_leaves_words_alone() {
        let cleaner = TextCleaner::new();
        let text = "INEXPERIENCED hires welcome";
        assert_eq!(cleaner.clean(text), text);
    }
}
