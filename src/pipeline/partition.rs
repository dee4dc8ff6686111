use crate::domain::DatasetRecord;

/// Stable, order-preserving partition of a record sequence into the full
/// sequence and its complete subset. `all` is the input, untouched; no
/// record is duplicated or dropped.
pub fn split_complete(records: Vec<DatasetRecord>) -> (Vec<DatasetRecord>, Vec<DatasetRecord>) {
    let complete = records
        .iter()
        .filter(|record| record.is_complete())
        .cloned()
        .collect();
    (records, complete)
}
