use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use docx_rs::{
    AbstractNumbering, Docx, Hyperlink, HyperlinkType, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Run, RunFonts, SpecialIndentType, Start,
};
use job_scraper::Posting;
use thiserror::Error;

pub const FILE_PREFIX: &str = "vagas_encontradas";
pub const HEADING: &str = "Vagas IT Support (Entry-Level)";
pub const EMPTY_MESSAGE: &str = "Nenhuma vaga encontrada com os filtros definidos.";

const FONT: &str = "Times New Roman";
/// half-points, 10pt
const FONT_SIZE: usize = 20;
const HEADING_SIZE: usize = 28;
const BULLET_NUMBERING: usize = 1;
const LINK_COLOR: &str = "0000FF";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("File error: '{0}'")]
    Io(#[from] std::io::Error),
    #[error("Failed to pack document: '{0}'")]
    Pack(String),
    #[error("Failed to serialize postings: '{0}'")]
    Json(#[from] serde_json::Error),
}

/// `vagas_encontradas_<YYYY-MM-DD>_<HH-MM-SS>.<ext>`
pub fn report_filename(at: NaiveDateTime, ext: &str) -> String {
    format!("{}_{}.{}", FILE_PREFIX, at.format("%Y-%m-%d_%H-%M-%S"), ext)
}

/// One bullet of the report: display text and its link target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub text: String,
    pub url: String,
}

pub fn report_lines(postings: &[Posting]) -> Vec<ReportLine> {
    postings
        .iter()
        .map(|posting| ReportLine {
            text: format!("{} — {}", posting.title, posting.level_label),
            url: posting.url.to_string(),
        })
        .collect()
}

fn bullet_numbering() -> AbstractNumbering {
    AbstractNumbering::new(BULLET_NUMBERING).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

fn bullet(line: &ReportLine) -> Paragraph {
    let link = Hyperlink::new(&line.url, HyperlinkType::External).add_run(
        Run::new()
            .add_text(&line.text)
            .color(LINK_COLOR)
            .underline("single"),
    );
    Paragraph::new()
        .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(0))
        .add_hyperlink(link)
}

/// Build the report document. An empty list yields a single explanatory line.
pub fn render(postings: &[Posting], generated_at: NaiveDateTime) -> Docx {
    let fonts = RunFonts::new()
        .ascii(FONT)
        .hi_ansi(FONT)
        .east_asia(FONT)
        .cs(FONT);
    let mut docx = Docx::new()
        .default_fonts(fonts)
        .default_size(FONT_SIZE)
        .add_abstract_numbering(bullet_numbering())
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(HEADING).bold().size(HEADING_SIZE)),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(format!(
            "Gerado em: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ))));

    let lines = report_lines(postings);
    if lines.is_empty() {
        return docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(EMPTY_MESSAGE)));
    }
    for line in &lines {
        docx = docx.add_paragraph(bullet(line));
    }
    docx
}

/// Serialize the document into DOCX bytes
pub fn pack(docx: Docx) -> Result<Vec<u8>, WriteError> {
    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| WriteError::Pack(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Write the DOCX report into `dir` and return its path.
/// The file is only created once the document packed.
pub fn write_report(
    postings: &[Posting],
    dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, WriteError> {
    let bytes = pack(render(postings, generated_at))?;
    let path = dir.join(report_filename(generated_at, "docx"));
    std::fs::write(&path, bytes)?;
    log::info!("wrote {} postings to {}", postings.len(), path.display());
    Ok(path)
}

/// Write the postings as JSON next to the report
pub fn write_json(
    postings: &[Posting],
    dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, WriteError> {
    let path = dir.join(report_filename(generated_at, "json"));
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, postings)?;
    log::info!("wrote json export to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use job_scraper::LevelLabel;
    use url::Url;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap()
    }

    fn posting() -> Posting {
        Posting {
            title: "IT Support Intern – Remote Helpdesk Role".to_owned(),
            url: Url::parse("https://example.com/job/123").unwrap(),
            level_label: LevelLabel::Intern,
            source_page: Url::parse("https://example.com/search").unwrap(),
        }
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            report_filename(generated_at(), "docx"),
            "vagas_encontradas_2024-03-05_07-08-09.docx"
        );
    }

    #[test]
    fn test_report_lines() {
        let lines = report_lines(&[posting()]);
        assert_eq!(
            lines,
            vec![ReportLine {
                text: "IT Support Intern – Remote Helpdesk Role — intern".to_owned(),
                url: "https://example.com/job/123".to_owned(),
            }]
        );
    }

    #[test]
    fn test_render_lists_postings() {
        let json = serde_json::to_string(&render(&[posting()], generated_at())).unwrap();
        assert!(json.contains("IT Support Intern – Remote Helpdesk Role — intern"));
        assert!(json.contains(HEADING));
        assert!(!json.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_render_empty_explains() {
        let json = serde_json::to_string(&render(&[], generated_at())).unwrap();
        assert!(json.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_write_report_creates_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&[posting()], dir.path(), generated_at()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "vagas_encontradas_2024-03-05_07-08-09.docx"
        );
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_pack_in_memory_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = pack(render(&[posting()], generated_at())).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        write_report(&[posting()], dir.path(), generated_at()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_report_empty_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&[], dir.path(), generated_at()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_report_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write_report(&[posting()], &missing, generated_at()).unwrap_err();
        assert!(matches!(err, WriteError::Io(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_json_roundtrip_postings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(&[posting()], dir.path(), generated_at()).unwrap();
        assert!(path.to_str().unwrap().ends_with(".json"));
        let data = std::fs::read_to_string(path).unwrap();
        let postings: Vec<Posting> = serde_json::from_str(&data).unwrap();
        assert_eq!(postings, vec![posting()]);
    }
}
