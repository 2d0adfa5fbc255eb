//! Reading historical observations: one CSV row per sample, rows paired as
//! (event counts, loss magnitudes) per risk.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, RiskError};
use crate::types::{RiskId, RiskRecordPair};

/// Parse headerless CSV where every field is a real number. Rows may differ
/// in length; blank lines are skipped.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                field.parse::<f64>().map_err(|e| {
                    RiskError::Input(format!(
                        "row {} column {}: {field:?} is not a number ({e})",
                        row_no + 1,
                        col + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Pair rows (0,1), (2,3), … into per-risk records. Sample values are
/// checked later by the estimators that consume them.
pub fn pair_rows(rows: Vec<Vec<f64>>) -> Result<Vec<RiskRecordPair>> {
    if rows.is_empty() {
        return Err(RiskError::Input(
            "no rows: at least one risk (two rows) is required".to_string(),
        ));
    }
    if rows.len() % 2 != 0 {
        return Err(RiskError::Input(format!(
            "{} rows leaves risk {} without a loss row",
            rows.len(),
            RiskId::from_row(rows.len() - 1)
        )));
    }

    let mut pairs = Vec::with_capacity(rows.len() / 2);
    let mut iter = rows.into_iter();
    let mut row = 0;
    while let (Some(events), Some(losses)) = (iter.next(), iter.next()) {
        pairs.push(RiskRecordPair { id: RiskId::from_row(row), events, losses });
        row += 2;
    }
    Ok(pairs)
}

pub fn load_pairs(path: impl AsRef<Path>) -> Result<Vec<RiskRecordPair>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let rows = read_rows(file)?;
    debug!(rows = rows.len(), "parsed {}", path.display());
    let pairs = pair_rows(rows)?;
    info!(risks = pairs.len(), "loaded {}", path.display());
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_rows() {
        let data = "1,1,2,2\n10, 20 ,10\n\n3\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows, vec![vec![1.0, 1.0, 2.0, 2.0], vec![10.0, 20.0, 10.0], vec![3.0]]);
    }

    #[test]
    fn non_numeric_field_reports_position() {
        let err = read_rows("1,2\n3,abc\n".as_bytes()).unwrap_err();
        match err {
            RiskError::Input(msg) => assert!(msg.contains("row 2 column 2"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn pairs_rows_in_order() {
        let rows = vec![
            vec![1.0, 2.0],
            vec![10.0, 20.0],
            vec![0.0, 3.0],
            vec![5.0],
        ];
        let pairs = pair_rows(rows).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].id, RiskId(1));
        assert_eq!(pairs[1].id, RiskId(2));
        assert_eq!(pairs[1].events, vec![0.0, 3.0]);
        assert_eq!(pairs[1].losses, vec![5.0]);
    }

    #[test]
    fn odd_row_count_is_input_error() {
        let rows = vec![vec![1.0], vec![10.0], vec![2.0]];
        assert!(matches!(pair_rows(rows), Err(RiskError::Input(_))));
        assert!(matches!(pair_rows(vec![]), Err(RiskError::Input(_))));
    }

    #[test]
    fn pairing_leaves_values_to_estimators() {
        let rows = vec![vec![-1.0], vec![10.0, 0.0]];
        let pairs = pair_rows(rows).unwrap();
        assert_eq!(pairs[0].events, vec![-1.0]);
        assert_eq!(pairs[0].losses, vec![10.0, 0.0]);
    }

    #[test]
    fn empty_field_is_input_error() {
        assert!(matches!(read_rows("1,,2\n".as_bytes()), Err(RiskError::Input(_))));
    }
}
