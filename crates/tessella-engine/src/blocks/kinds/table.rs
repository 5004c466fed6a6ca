use crate::blocks::data::BlockData;
use crate::blocks::payload::Payload;
use crate::blocks::registry::BlockType;

/// Rectangular cell grid with an optional header row.
#[derive(Debug)]
pub struct Table;

/// Pad ragged rows so every row has the same number of cells.
fn normalize_rows(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1);
    if rows.is_empty() {
        rows.push(vec![String::new(); width]);
    }
    for row in rows.iter_mut() {
        row.resize(width, String::new());
    }
    rows
}

impl BlockType for Table {
    fn tag(&self) -> &str {
        "table"
    }

    fn construct(&self, data: &BlockData) -> Payload {
        Payload::Table {
            header: data.header.unwrap_or(false),
            rows: normalize_rows(data.rows.clone().unwrap_or_default()),
        }
    }

    fn extract(&self, payload: &Payload) -> BlockData {
        match payload {
            Payload::Table { header, rows } => {
                let mut data = BlockData::default().rows(rows.clone());
                data.header = Some(*header);
                data
            }
            _ => BlockData::default(),
        }
    }

    fn update(&self, payload: &mut Payload, data: &BlockData) {
        if let Payload::Table { header, rows } = payload {
            if let Some(new_header) = data.header {
                *header = new_header;
            }
            if let Some(new_rows) = &data.rows {
                *rows = normalize_rows(new_rows.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_padded() {
        let payload = Table.construct(&BlockData::default().rows(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ]));
        match payload {
            Payload::Table { rows, .. } => {
                assert_eq!(rows[1], vec!["c".to_string(), String::new()]);
            }
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn empty_table_gets_one_blank_cell() {
        let payload = Table.construct(&BlockData::default());
        match payload {
            Payload::Table { rows, .. } => {
                assert_eq!(rows, vec![vec![String::new()]]);
            }
            _ => panic!("expected table"),
        }
    }
}
