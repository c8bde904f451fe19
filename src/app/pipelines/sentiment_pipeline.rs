use crate::config::toml_config::{ExportConfig, SUPPORTED_FORMATS};
use crate::core::labeler::SentimentLabeler;
use crate::core::query::QueryExecutor;
use crate::core::{
    LabeledPost, Pipeline, PostRecord, PostSearch, SearchRequest, SentimentClassifier, Storage,
    TransformResult,
};
use crate::domain::model::ExportRow;
use crate::utils::error::{EtlError, Result};
use rust_xlsxwriter::Workbook;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const EXPORT_COLUMNS: [&str; 5] = ["id", "texto", "autor", "fecha", "sentimiento"];

/// Search, label and export for a single request.
pub struct SentimentPipeline<S: Storage, Q: PostSearch, C: SentimentClassifier> {
    pub(crate) storage: S,
    pub(crate) executor: QueryExecutor<Q>,
    pub(crate) labeler: SentimentLabeler<C>,
    pub(crate) request: SearchRequest,
    pub(crate) export: ExportConfig,
}

impl<S: Storage, Q: PostSearch, C: SentimentClassifier> SentimentPipeline<S, Q, C> {
    pub fn new(
        storage: S,
        executor: QueryExecutor<Q>,
        labeler: SentimentLabeler<C>,
        request: SearchRequest,
        export: ExportConfig,
    ) -> Self {
        Self {
            storage,
            executor,
            labeler,
            request,
            export,
        }
    }
}

#[async_trait::async_trait]
impl<S, Q, C> Pipeline for SentimentPipeline<S, Q, C>
where
    S: Storage,
    Q: PostSearch,
    C: SentimentClassifier,
{
    async fn extract(&self) -> Result<Vec<PostRecord>> {
        self.executor.execute(&self.request).await
    }

    async fn transform(&self, posts: Vec<PostRecord>) -> Result<TransformResult> {
        tracing::info!("🔧 Classifying {} posts", posts.len());
        let labeled_posts = self.labeler.label_all(posts).await;

        let xlsx_output = render_xlsx(&labeled_posts)?;
        let csv_output = render_csv(&labeled_posts)?;
        let rows: Vec<ExportRow<'_>> = labeled_posts.iter().map(ExportRow::from).collect();
        let json_output = serde_json::to_string_pretty(&rows)?;

        Ok(TransformResult {
            labeled_posts,
            xlsx_output,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<Vec<String>> {
        let stem = export_stem(&self.request);
        let files: Vec<(String, &[u8])> = SUPPORTED_FORMATS
            .iter()
            .filter(|format| self.export.wants(format))
            .map(|&format| {
                let content: &[u8] = match format {
                    "xlsx" => &result.xlsx_output,
                    "csv" => result.csv_output.as_bytes(),
                    _ => result.json_output.as_bytes(),
                };
                (format!("{}.{}", stem, format), content)
            })
            .collect();

        if files.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "export.output_formats".to_string(),
                value: self.export.output_formats.join(","),
                reason: format!("Expected one of: {}", SUPPORTED_FORMATS.join(", ")),
            });
        }

        if !self.export.compression {
            let mut written = Vec::with_capacity(files.len());
            for (name, content) in files {
                written.push(self.storage.write_file(&name, content).await?);
            }
            return Ok(written);
        }

        tracing::debug!("Creating ZIP file with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (name, content) in &files {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(content)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        let archive_name = format!("{}.zip", stem);
        let path = self.storage.write_file(&archive_name, &zip_data).await?;
        Ok(vec![path])
    }
}

/// 單一工作表，第一列為欄位名稱，缺值留空
pub fn render_xlsx(posts: &[LabeledPost]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("tweets")?;

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    for (index, post) in posts.iter().enumerate() {
        let row = ExportRow::from(post);
        let line = index as u32 + 1;
        worksheet.write_string(line, 0, row.id)?;
        worksheet.write_string(line, 1, row.texto)?;
        if let Some(autor) = row.autor {
            worksheet.write_string(line, 2, autor)?;
        }
        if let Some(fecha) = &row.fecha {
            worksheet.write_string(line, 3, fecha)?;
        }
        worksheet.write_string(line, 4, row.sentimiento)?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn render_csv(posts: &[LabeledPost]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // 即使沒有資料也輸出標題列
    writer.write_record(EXPORT_COLUMNS)?;
    for post in posts {
        writer.serialize(ExportRow::from(post))?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// `tweets_{keyword}_{start}_a_{end}`, with `ahora` when there is no end date.
/// Letters in any script are kept; separators and punctuation become `_`.
pub fn export_stem(request: &SearchRequest) -> String {
    let keyword: String = request
        .keyword
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let end = request
        .end_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "ahora".to_string());

    format!("tweets_{}_{}_a_{}", keyword, request.start_date, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SearchQuery, Sentiment};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("mock://{}", path))
        }
    }

    struct NoSearch;

    #[async_trait]
    impl PostSearch for NoSearch {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<PostRecord>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    struct EchoClassifier;

    #[async_trait]
    impl SentimentClassifier for EchoClassifier {
        async fn classify(&self, prompt: &str) -> Result<String> {
            if prompt.contains("odio") {
                Ok("negativo".to_string())
            } else {
                Err(EtlError::ClassifierError {
                    message: "unavailable".to_string(),
                })
            }
        }
    }

    fn request(end_date: Option<NaiveDate>) -> SearchRequest {
        SearchRequest {
            keyword: "open ai/gpt".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date,
            max_results: 20,
        }
    }

    fn pipeline(
        storage: MockStorage,
        export: ExportConfig,
    ) -> SentimentPipeline<MockStorage, NoSearch, EchoClassifier> {
        SentimentPipeline::new(
            storage,
            QueryExecutor::new(NoSearch),
            SentimentLabeler::new(EchoClassifier),
            request(NaiveDate::from_ymd_opt(2024, 1, 2)),
            export,
        )
    }

    fn posts() -> Vec<PostRecord> {
        vec![
            PostRecord {
                id: "1".to_string(),
                text: "odio los lunes, de verdad".to_string(),
                author_id: Some("7".to_string()),
                created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
            },
            PostRecord {
                id: "2".to_string(),
                text: "sin opinion".to_string(),
                author_id: None,
                created_at: None,
            },
        ]
    }

    #[test]
    fn test_export_stem_sanitizes_keyword() {
        assert_eq!(
            export_stem(&request(NaiveDate::from_ymd_opt(2024, 1, 2))),
            "tweets_open_ai_gpt_2024-01-01_a_2024-01-02"
        );
        assert_eq!(
            export_stem(&request(None)),
            "tweets_open_ai_gpt_2024-01-01_a_ahora"
        );
    }

    #[test]
    fn test_export_stem_keeps_non_ascii_letters() {
        let request = SearchRequest {
            keyword: "café/té".to_string(),
            ..request(None)
        };
        assert_eq!(export_stem(&request), "tweets_café_té_2024-01-01_a_ahora");
    }

    #[test]
    fn test_render_csv_writes_header_for_empty_batch() {
        assert_eq!(render_csv(&[]).unwrap(), "id,texto,autor,fecha,sentimiento\n");
    }

    #[tokio::test]
    async fn test_transform_labels_every_post() {
        let pipeline = pipeline(MockStorage::new(), ExportConfig::default());

        let result = pipeline.transform(posts()).await.unwrap();

        assert_eq!(result.labeled_posts.len(), 2);
        assert_eq!(
            result.labeled_posts[0].sentiment,
            Sentiment::Label("negativo".to_string())
        );
        assert_eq!(result.labeled_posts[1].sentiment, Sentiment::Error);

        let lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(lines[0], "id,texto,autor,fecha,sentimiento");
        assert_eq!(
            lines[1],
            "1,\"odio los lunes, de verdad\",7,2024-01-01T09:00:00Z,negativo"
        );
        assert_eq!(lines[2], "2,sin opinion,,,Error");

        let json: serde_json::Value = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(json[0]["sentimiento"], "negativo");
        assert_eq!(json[1]["autor"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_xlsx_workbook_holds_header_and_rows() {
        let pipeline = pipeline(MockStorage::new(), ExportConfig::default());
        let result = pipeline.transform(posts()).await.unwrap();

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(result.xlsx_output.clone())).unwrap();
        assert!(archive.by_name("xl/workbook.xml").is_ok());
        assert!(archive.by_name("xl/worksheets/sheet1.xml").is_ok());

        let mut strings = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("xl/sharedStrings.xml").unwrap(),
            &mut strings,
        )
        .unwrap();
        for column in EXPORT_COLUMNS {
            assert!(strings.contains(column), "missing column {}", column);
        }
        assert!(strings.contains("odio los lunes, de verdad"));
        assert!(strings.contains("negativo"));
        assert!(strings.contains("Error"));
    }

    #[tokio::test]
    async fn test_default_export_writes_xlsx_only() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone(), ExportConfig::default());

        let result = pipeline.transform(posts()).await.unwrap();
        let files = pipeline.load(&result).await.unwrap();

        let name = "tweets_open_ai_gpt_2024-01-01_a_2024-01-02.xlsx";
        assert_eq!(files, vec![format!("mock://{}", name)]);
        assert_eq!(storage.get_file(name).await.unwrap(), result.xlsx_output);
    }

    #[tokio::test]
    async fn test_load_writes_each_selected_format() {
        let storage = MockStorage::new();
        let export = ExportConfig {
            output_formats: vec!["csv".to_string(), "json".to_string()],
            ..ExportConfig::default()
        };
        let pipeline = pipeline(storage.clone(), export);

        let result = pipeline.transform(posts()).await.unwrap();
        let files = pipeline.load(&result).await.unwrap();

        assert_eq!(files.len(), 2);
        let stem = "tweets_open_ai_gpt_2024-01-01_a_2024-01-02";
        let csv = storage.get_file(&format!("{}.csv", stem)).await.unwrap();
        assert_eq!(csv, result.csv_output.as_bytes());
        assert!(storage.get_file(&format!("{}.json", stem)).await.is_some());
    }

    #[tokio::test]
    async fn test_load_bundles_zip_when_compressed() {
        let storage = MockStorage::new();
        let export = ExportConfig {
            output_formats: vec!["csv".to_string(), "json".to_string(), "xlsx".to_string()],
            compression: true,
            ..ExportConfig::default()
        };
        let pipeline = pipeline(storage.clone(), export);

        let result = pipeline.transform(posts()).await.unwrap();
        let files = pipeline.load(&result).await.unwrap();

        let archive_name = "tweets_open_ai_gpt_2024-01-01_a_2024-01-02.zip";
        assert_eq!(files, vec![format!("mock://{}", archive_name)]);

        let zip_data = storage.get_file(archive_name).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "tweets_open_ai_gpt_2024-01-01_a_2024-01-02.csv",
                "tweets_open_ai_gpt_2024-01-01_a_2024-01-02.json",
                "tweets_open_ai_gpt_2024-01-01_a_2024-01-02.xlsx"
            ]
        );
    }
}
