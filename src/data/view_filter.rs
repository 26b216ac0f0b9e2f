use tracing::trace;

use crate::data::record::Record;

/// True when `needle_lower` occurs in any string field of `record`.
/// The needle must already be lowercased.
pub fn record_matches(record: &Record, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    record
        .string_values()
        .any(|value| value.to_lowercase().contains(needle_lower))
}

/// Store positions of the records matching `query`, in store order
///
/// Case-insensitive substring match on string-typed fields only; an empty
/// query keeps every record.
pub fn filter_indices(records: &[Record], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    let visible: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record_matches(record, &needle))
        .map(|(idx, _)| idx)
        .collect();

    trace!(target: "filter", "query {:?} kept {}/{}", query, visible.len(), records.len());
    visible
}

/// Borrowing form of [`filter_indices`]
pub fn filter<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    filter_indices(records, query)
        .into_iter()
        .map(|idx| &records[idx])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new(1u64)
                .with_field("name", "Aaron Miles")
                .with_field("email", "aaron@mailinator.com")
                .with_field("role", "member"),
            Record::new(2u64)
                .with_field("name", "Aishwarya Naik")
                .with_field("email", "aishwarya@mailinator.com")
                .with_field("role", "admin"),
            Record::new(3u64)
                .with_field("name", "Arvind Kumar")
                .with_field("email", "arvind@mailinator.com")
                .with_field("role", "member")
                .with_field("level", 7),
        ]
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        let records = sample();
        assert_eq!(filter_indices(&records, ""), vec![0, 1, 2]);
    }

    #[test]
    fn test_case_insensitive_any_field() {
        let records = sample();
        let hits: Vec<u64> = filter(&records, "ADMIN").iter().map(|r| r.id.0).collect();
        assert_eq!(hits, vec![2]);

        let hits: Vec<u64> = filter(&records, "mIlEs").iter().map(|r| r.id.0).collect();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_non_string_fields_ignored() {
        let records = sample();
        assert!(filter(&records, "7").is_empty());
    }

    #[test]
    fn test_no_match_yields_empty() {
        let records = sample();
        assert!(filter_indices(&records, "zzz-nobody").is_empty());
    }
}
