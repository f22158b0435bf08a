// pipeline/orchestrator.rs

//! # Bulk Generation Orchestrator
//!
//! Generates one PDF slip per row of a table.
//!
//! Binding, rendering and file naming run row by row on the calling task; the
//! PDF rendering of each accepted row is dispatched to a blocking task inside
//! a `JoinSet`, bounded by a semaphore. The orchestrator joins every task
//! before returning, so a report is always complete for the rows it started.
//!
//! Per-row problems (unresolved identifier, missing template field, rejected
//! file name, PDF engine failure) become failed outcomes. Only a template that
//! cannot be loaded at batch start aborts the batch.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let generator = BulkGenerator::new(Arc::new(WkhtmltopdfRenderer::new(&settings.renderer)), 4)
//!     .with_cancel(token);
//! let report = generator.generate_batch(&table, &job, |_| extras.clone()).await?;
//! println!("{}", report);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::utils::clean_cell;
use crate::dataset::{Row, Table};
use crate::template::context::{bind, RenderContext};
use crate::template::engine::render;
use crate::template::mapping::{map_column, FieldMapping, FieldSpec};
use crate::template::parser::{self, ParsedTemplate};

use super::cancel::CancelToken;
use super::naming::output_filename;
use super::pdf::PdfRenderer;
use super::BatchError;

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchState::NotStarted => "not started",
            BatchState::Running => "running",
            BatchState::Completed => "completed",
            BatchState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Result for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub identifier: String,
    pub success: bool,
    pub message: String,
}

impl GenerationOutcome {
    fn success(identifier: String, file: &str) -> Self {
        Self {
            identifier,
            success: true,
            message: format!("Generated {}", file),
        }
    }

    fn failure(identifier: String, message: impl Into<String>) -> Self {
        Self {
            identifier,
            success: false,
            message: message.into(),
        }
    }
}

/// Aggregated result of a batch. Outcomes are in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub total: usize,
    pub state: BatchState,
    pub outcomes: Vec<GenerationOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &GenerationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} generated", self.succeeded, self.total)
    }
}

/// Everything a batch needs besides the data.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// HTML template file
    pub template: PathBuf,

    /// Field specification from the JSON mapping file
    pub field_spec: FieldSpec,

    /// Identifier column hint, matched against the table's columns
    pub identifier_column: String,

    /// Literal bound to the `branch` field
    pub branch: String,

    /// Directory receiving `employee_<id>.pdf` files
    pub output_dir: PathBuf,
}

/// Drives PDF generation for whole tables.
pub struct BulkGenerator {
    renderer: Arc<dyn PdfRenderer>,
    workers: usize,
    cancel: CancelToken,
    skip_existing: bool,
    progress: Option<ProgressBar>,
}

/// A row that passed binding, rendering and naming.
struct PreparedRow {
    index: usize,
    identifier: String,
    file_name: String,
    html: String,
}

impl BulkGenerator {
    pub fn new(renderer: Arc<dyn PdfRenderer>, workers: usize) -> Self {
        Self {
            renderer,
            workers: workers.max(1),
            cancel: CancelToken::new(),
            skip_existing: false,
            progress: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Rows whose output file already exists are not rendered again.
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Generates one slip per row of `table`.
    ///
    /// `extras` supplies additional context values per row (month, year) and
    /// overrides mapped fields of the same name.
    pub async fn generate_batch<F>(
        &self,
        table: &Table,
        job: &BatchJob,
        extras: F,
    ) -> Result<BatchReport, BatchError>
    where
        F: Fn(&Row) -> RenderContext,
    {
        let template = load_template(job)?;
        fs::create_dir_all(&job.output_dir)?;

        let mapping = FieldMapping::resolve(&job.field_spec, table.columns())
            .with_identifier(&job.identifier_column, table.columns())
            .with_branch(&job.branch);

        let uncovered = mapping.uncovered(&template.tokens, &["month", "year"]);
        if !uncovered.is_empty() {
            warn!("[PARSE] template fields without a mapping: {}", uncovered.join(", "));
        }

        let total = table.len();
        info!("[PDF] generating {} slip(s) into {}", total, job.output_dir.display());

        let mut state = BatchState::NotStarted;
        debug!("[PDF] batch {}", state);
        state = BatchState::Running;

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut outcomes: Vec<(usize, GenerationOutcome)> = Vec::with_capacity(total);
        let mut claimed: HashSet<String> = HashSet::new();

        for (index, row) in table.rows().iter().enumerate() {
            if self.cancel.is_cancelled() {
                state = BatchState::Cancelled;
                break;
            }

            let prepared = match prepare_row(index, &template, &mapping, row, &extras(row)) {
                Ok(prepared) => prepared,
                Err(outcome) => {
                    self.record_failure(&outcome);
                    outcomes.push((index, outcome));
                    continue;
                }
            };

            let dest = job.output_dir.join(&prepared.file_name);
            if self.skip_existing && dest.exists() {
                let outcome = GenerationOutcome::failure(
                    prepared.identifier,
                    format!("{} already exists", prepared.file_name),
                );
                self.record_failure(&outcome);
                outcomes.push((index, outcome));
                continue;
            }

            // Two rows must never write the same file concurrently.
            if !claimed.insert(prepared.file_name.clone()) {
                let outcome = GenerationOutcome::failure(
                    prepared.identifier,
                    format!("{} is already written by an earlier row", prepared.file_name),
                );
                self.record_failure(&outcome);
                outcomes.push((index, outcome));
                continue;
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| BatchError::Runtime(e.to_string()))?;

            if self.cancel.is_cancelled() {
                state = BatchState::Cancelled;
                break;
            }

            let renderer = Arc::clone(&self.renderer);
            let progress = self.progress.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = renderer.render_to_file(&prepared.html, &dest);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                let outcome = match result {
                    Ok(()) => GenerationOutcome::success(prepared.identifier, &prepared.file_name),
                    Err(e) => GenerationOutcome::failure(prepared.identifier, e.to_string()),
                };
                (prepared.index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if !outcome.success {
                        warn!("[PDF] {}: {}", outcome.identifier, outcome.message);
                    }
                    outcomes.push((index, outcome));
                }
                Err(e) => {
                    warn!("[PDF] render task failed: {}", e);
                    outcomes.push((
                        usize::MAX,
                        GenerationOutcome::failure("<unknown>".to_string(), e.to_string()),
                    ));
                }
            }
        }

        if state == BatchState::Running {
            state = BatchState::Completed;
        }
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<GenerationOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
        let succeeded = outcomes.iter().filter(|o| o.success).count();

        info!("[PDF] batch {}: {} of {} generated", state, succeeded, total);
        Ok(BatchReport {
            succeeded,
            total,
            state,
            outcomes,
        })
    }

    /// Generates the slip of the row whose identifier equals `identifier`.
    pub async fn generate_one<F>(
        &self,
        table: &Table,
        job: &BatchJob,
        identifier: &str,
        extras: F,
    ) -> Result<GenerationOutcome, BatchError>
    where
        F: Fn(&Row) -> RenderContext,
    {
        let row = find_row(table, &job.identifier_column, identifier)
            .ok_or_else(|| BatchError::NotFound(identifier.to_string()))?;

        let single = Table::new(table.columns().to_vec(), vec![row.values().to_vec()]);
        let report = self.generate_batch(&single, job, extras).await?;

        report
            .outcomes
            .into_iter()
            .next()
            .ok_or_else(|| BatchError::Runtime("generation was cancelled".to_string()))
    }

    fn record_failure(&self, outcome: &GenerationOutcome) {
        warn!("[PDF] {}: {}", outcome.identifier, outcome.message);
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }
}

/// Finds the row whose identifier column (matched fuzzily) holds `identifier`.
pub fn find_row<'a>(table: &'a Table, identifier_column: &str, identifier: &str) -> Option<&'a Row> {
    let column = map_column(table.columns(), identifier_column)?;
    table.find_by(&column, identifier)
}

fn load_template(job: &BatchJob) -> Result<ParsedTemplate, BatchError> {
    let template = parser::load(&job.template);
    if template.is_empty() {
        return Err(BatchError::TemplateUnavailable(job.template.clone()));
    }
    Ok(template)
}

fn prepare_row(
    index: usize,
    template: &ParsedTemplate,
    mapping: &FieldMapping,
    row: &Row,
    extras: &RenderContext,
) -> Result<PreparedRow, GenerationOutcome> {
    let context = bind(mapping, row, extras);
    let row_label = format!("row {}", index + 1);

    let identifier = match mapping.identifier_column() {
        Some(column) => clean_cell(row.get(column).unwrap_or_default()),
        None => {
            return Err(GenerationOutcome::failure(
                row_label,
                "identifier column is required but was not found",
            ))
        }
    };

    let html = render(&template.format, &context)
        .map_err(|e| GenerationOutcome::failure(identifier.clone(), e.to_string()))?;

    let file_name = output_filename(&identifier)
        .map_err(|e| GenerationOutcome::failure(identifier.clone(), e.to_string()))?;

    Ok(PreparedRow {
        index,
        identifier,
        file_name,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pdf::PdfError;
    use crate::template::mapping::parse_field_spec;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Writes the HTML as the "PDF", optionally failing or cancelling.
    #[derive(Default)]
    struct FakeRenderer {
        calls: AtomicUsize,
        rendered: Mutex<Vec<String>>,
        fail_for: Option<String>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl PdfRenderer for FakeRenderer {
        fn render_to_file(&self, html: &str, dest: &Path) -> Result<(), PdfError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, token)) = &self.cancel_after {
                if call >= *after {
                    token.cancel();
                }
            }
            if let Some(bad) = &self.fail_for {
                if html.contains(bad.as_str()) {
                    return Err(PdfError::Failed {
                        status: "exit status: 1".to_string(),
                        stderr: "engine error".to_string(),
                    });
                }
            }
            self.rendered.lock().unwrap().push(html.to_string());
            fs::write(dest, html)?;
            Ok(())
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn job(dir: &TempDir, template: &str, mapping: &str) -> BatchJob {
        let template_path = dir.path().join("slip.html");
        fs::write(&template_path, template).unwrap();
        BatchJob {
            template: template_path,
            field_spec: parse_field_spec(mapping).unwrap(),
            identifier_column: "HR EMP CODE".to_string(),
            branch: "Sion".to_string(),
            output_dir: dir.path().join("out"),
        }
    }

    fn no_extras(_: &Row) -> RenderContext {
        RenderContext::new()
    }

    fn employees(ids: &[&str]) -> Table {
        Table::new(
            strings(&["HR EMP CODE", "Name", "Email"]),
            ids.iter()
                .map(|id| strings(&[id, &format!("Name {}", id), "x@y.com"]))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_single_row_end_to_end() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = Table::new(
            strings(&["HR EMP CODE", "Name", "Email"]),
            vec![strings(&["E100", "Jane Doe", "jane@x.com"])],
        );
        let renderer = Arc::new(FakeRenderer::default());

        let report = BulkGenerator::new(renderer.clone(), 2)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (1, 1));
        assert_eq!(report.state, BatchState::Completed);
        assert_eq!(report.to_string(), "1 of 1 generated");
        let written = fs::read_to_string(job.output_dir.join("employee_E100.pdf")).unwrap();
        assert_eq!(written, "<p>Jane Doe</p>");
    }

    #[tokio::test]
    async fn test_identifier_with_slash() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{__id__}}</p>", "{}");
        let table = employees(&["E/100"]);

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 1)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        let written = fs::read_to_string(job.output_dir.join("employee_E100.pdf")).unwrap();
        assert_eq!(written, "<p>E/100</p>");
    }

    #[tokio::test]
    async fn test_missing_token_is_row_failure() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Missing}}</p>", r#"{"Name": "Name"}"#);
        let table = employees(&["E1", "E2"]);

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 2)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (0, 2));
        assert_eq!(report.state, BatchState::Completed);
        assert!(report.outcomes[0].message.contains("Missing"));
        assert_eq!(report.outcomes[0].identifier, "E1");
    }

    #[tokio::test]
    async fn test_mixed_outcomes_keep_row_order() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{__id__}} {{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = employees(&["E1", "E 2", "E3", "E4"]);
        let renderer = Arc::new(FakeRenderer {
            fail_for: Some("E3".to_string()),
            ..FakeRenderer::default()
        });

        let report = BulkGenerator::new(renderer, 3)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (2, 4));
        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E 2", "E3", "E4"]);
        assert!(!report.outcomes[1].success);
        assert!(report.outcomes[1].message.contains("not a valid output file name"));
        assert!(report.outcomes[2].message.contains("engine error"));
        assert_eq!(report.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_extras_are_bound() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "{{Name}} {{month}}-{{year}} {{branch}}", r#"{"Name": "Name"}"#);
        let table = employees(&["E1"]);

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 1)
            .generate_batch(&table, &job, |_| {
                let mut extras = RenderContext::new();
                extras.add_variable("month".into(), "March".into());
                extras.add_variable("year".into(), "2024".into());
                extras
            })
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        let written = fs::read_to_string(job.output_dir.join("employee_E1.pdf")).unwrap();
        assert_eq!(written, "Name E1 March-2024 Sion");
    }

    #[tokio::test]
    async fn test_missing_identifier_column_fails_every_row() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = Table::new(
            strings(&["Name"]),
            vec![strings(&["Jane"]), strings(&["John"])],
        );

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 2)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (0, 2));
        assert!(report.outcomes.iter().all(|o| o.message.contains("identifier")));
    }

    #[tokio::test]
    async fn test_duplicate_file_names_fail_later_rows() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = employees(&["", "E2", "", "E/2"]);
        let renderer = Arc::new(FakeRenderer::default());

        let report = BulkGenerator::new(renderer.clone(), 4)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (2, 4));
        assert!(report.outcomes[0].success && report.outcomes[1].success);
        assert!(report.outcomes[2].message.contains("employee_none.pdf"));
        assert!(report.outcomes[3].message.contains("employee_E2.pdf"));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
        assert!(job.output_dir.join("employee_none.pdf").exists());
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = employees(&["E1", "E2", "E3", "E4", "E5"]);
        let token = CancelToken::new();
        let renderer = Arc::new(FakeRenderer {
            cancel_after: Some((2, token.clone())),
            ..FakeRenderer::default()
        });

        let report = BulkGenerator::new(renderer.clone(), 1)
            .with_cancel(token)
            .generate_batch(&table, &job, no_extras)
            .await
            .unwrap();

        assert_eq!(report.state, BatchState::Cancelled);
        assert_eq!(report.total, 5);
        assert!(report.succeeded <= 2);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
        assert!(!job.output_dir.join("employee_E3.pdf").exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let token = CancelToken::new();
        token.cancel();

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 2)
            .with_cancel(token)
            .generate_batch(&employees(&["E1", "E2"]), &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (0, 2));
        assert_eq!(report.state, BatchState::Cancelled);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_empty_table() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 2)
            .generate_batch(&employees(&[]), &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (0, 0));
        assert_eq!(report.state, BatchState::Completed);
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal() {
        let dir = tempdir().unwrap();
        let mut job = job(&dir, "", "{}");
        let renderer = Arc::new(FakeRenderer::default());
        let generator = BulkGenerator::new(renderer.clone(), 2);

        let result = generator.generate_batch(&employees(&["E1"]), &job, no_extras).await;
        assert!(matches!(result, Err(BatchError::TemplateUnavailable(_))));

        job.template = dir.path().join("absent.html");
        let result = generator.generate_batch(&employees(&["E1"]), &job, no_extras).await;
        assert!(matches!(result, Err(BatchError::TemplateUnavailable(_))));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skip_existing() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        fs::create_dir_all(&job.output_dir).unwrap();
        fs::write(job.output_dir.join("employee_E1.pdf"), "old").unwrap();

        let report = BulkGenerator::new(Arc::new(FakeRenderer::default()), 2)
            .skip_existing(true)
            .generate_batch(&employees(&["E1", "E2"]), &job, no_extras)
            .await
            .unwrap();

        assert_eq!((report.succeeded, report.total), (1, 2));
        assert!(report.outcomes[0].message.contains("already exists"));
        assert_eq!(
            fs::read_to_string(job.output_dir.join("employee_E1.pdf")).unwrap(),
            "old"
        );
    }

    #[tokio::test]
    async fn test_generate_one() {
        let dir = tempdir().unwrap();
        let job = job(&dir, "<p>{{Name}}</p>", r#"{"Name": "Name"}"#);
        let table = employees(&["E1", "E2"]);
        let generator = BulkGenerator::new(Arc::new(FakeRenderer::default()), 1);

        let outcome = generator.generate_one(&table, &job, "E2", no_extras).await.unwrap();
        assert!(outcome.success);
        assert!(job.output_dir.join("employee_E2.pdf").exists());
        assert!(!job.output_dir.join("employee_E1.pdf").exists());

        let missing = generator.generate_one(&table, &job, "E9", no_extras).await;
        match missing {
            Err(BatchError::NotFound(id)) => assert_eq!(id, "E9"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
