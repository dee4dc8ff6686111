use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::segment::{HeaderSegmenter, SegmentReport, Segmenter};
use crate::source::CaseLoader;

pub mod artifact;
pub mod builder;
pub mod partition;

use builder::RecordBuilder;

/// Result of a complete build run.
#[derive(Debug, Serialize)]
pub struct BuildResult {
    pub total_cases: usize,
    pub complete_records: usize,
    pub output_file: String,
    pub report: SegmentReport,
}

/// Result of a filter run.
#[derive(Debug, Serialize)]
pub struct FilterResult {
    pub total_records: usize,
    pub complete_records: usize,
    pub output_file: String,
}

/// Result of an analyze run over an existing artifact.
#[derive(Debug, Serialize)]
pub struct AnalyzeResult {
    pub total_records: usize,
    pub complete_records: usize,
    pub report: SegmentReport,
}

pub struct Pipeline;

impl Pipeline {
    /// Load the raw corpus, segment every note, and write the full record
    /// sequence to `out_path`. Fails fast on the first malformed case or
    /// duplicate id; segmentation itself never fails.
    #[instrument(skip_all, fields(input = %input_root.display()))]
    pub fn build(
        input_root: &Path,
        out_path: &Path,
        source_label: &str,
        split: &str,
    ) -> Result<BuildResult> {
        let loader = CaseLoader::new(input_root);
        let segmenter = HeaderSegmenter::new();
        let mut builder = RecordBuilder::new(source_label, split);
        let mut report = SegmentReport::default();
        let mut records = Vec::new();

        for case in loader.cases()? {
            let case = case?;
            let note = segmenter.segment(&case.note_text);
            report.observe(&note);
            if !note.is_complete() {
                debug!(case_id = %case.id, "note has unextracted sections");
            }
            records.push(builder.build(&case, note)?);
        }

        artifact::write_records(out_path, &records)?;

        let complete_records = records.iter().filter(|r| r.is_complete()).count();
        info!(
            "Built {} records ({} complete) from {}",
            records.len(),
            complete_records,
            input_root.display()
        );

        Ok(BuildResult {
            total_cases: records.len(),
            complete_records,
            output_file: out_path.display().to_string(),
            report,
        })
    }

    /// Re-read a built artifact and write its complete subset to `out_path`.
    #[instrument(skip_all, fields(input = %input.display()))]
    pub fn filter(input: &Path, out_path: &Path) -> Result<FilterResult> {
        let records = artifact::read_records(input)?;
        let (all, complete) = partition::split_complete(records);
        artifact::write_records(out_path, &complete)?;

        info!(
            "Filtered {} records down to {} complete",
            all.len(),
            complete.len()
        );

        Ok(FilterResult {
            total_records: all.len(),
            complete_records: complete.len(),
            output_file: out_path.display().to_string(),
        })
    }

    /// Completeness report over an existing artifact. Read-only.
    pub fn analyze(input: &Path) -> Result<AnalyzeResult> {
        let records = artifact::read_records(input)?;
        let mut report = SegmentReport::default();
        for record in &records {
            report.observe(&record.note);
        }
        let complete_records = records.iter().filter(|r| r.is_complete()).count();

        Ok(AnalyzeResult {
            total_records: records.len(),
            complete_records,
            report,
        })
    }
}
