use tracing::debug;

use crate::models::{OutputColumn, OutputTable};

/// Identity columns carried down onto the transaction rows of an episode.
pub const IDENTITY_COLUMNS: [OutputColumn; 4] = [
    OutputColumn::ClientName,
    OutputColumn::ClientInvoiceNumber,
    OutputColumn::ClientRegisterNumber,
    OutputColumn::Kelas,
];

/// Forward-fill each column independently: an empty cell takes the nearest
/// non-empty value above it. Leading empties stay empty.
pub fn forward_fill(table: &mut OutputTable, columns: &[OutputColumn]) {
    for &column in columns {
        let mut last: Option<String> = None;
        let mut filled = 0usize;
        for row in table.rows_mut() {
            let value = row.get(column);
            if value.is_empty() {
                if let Some(prev) = &last {
                    row.set(column, prev.as_str());
                    filled += 1;
                }
            } else {
                last = Some(value.to_string());
            }
        }
        if filled > 0 {
            debug!(column = column.header(), filled, "forward-filled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputRow;

    fn table(names: &[&str]) -> OutputTable {
        OutputTable::new(
            names
                .iter()
                .map(|n| {
                    let mut row = OutputRow::new();
                    row.set(OutputColumn::ClientName, *n);
                    row
                })
                .collect(),
        )
    }

    fn names(table: &OutputTable) -> Vec<&str> {
        table.column_values(OutputColumn::ClientName).collect()
    }

    #[test]
    fn fills_downward_but_not_leading_gaps() {
        let mut t = table(&["", "Ani", "", "", "Budi", ""]);
        forward_fill(&mut t, &IDENTITY_COLUMNS);
        assert_eq!(names(&t), ["", "Ani", "Ani", "Ani", "Budi", "Budi"]);
    }

    #[test]
    fn columns_are_filled_independently() {
        let mut t = table(&["Ani", ""]);
        t.rows_mut()[1].set(OutputColumn::Kelas, "VIP");
        forward_fill(&mut t, &IDENTITY_COLUMNS);
        assert_eq!(t.rows()[1].get(OutputColumn::ClientName), "Ani");
        assert_eq!(t.rows()[0].get(OutputColumn::Kelas), "");
        // columns outside the set are untouched
        assert_eq!(t.rows()[1].get(OutputColumn::ProvId), "");
    }

    #[test]
    fn filling_twice_changes_nothing() {
        let mut once = table(&["", "Ani", "", "Budi", ""]);
        forward_fill(&mut once, &IDENTITY_COLUMNS);
        let mut twice = once.clone();
        forward_fill(&mut twice, &IDENTITY_COLUMNS);
        assert_eq!(once, twice);
    }
}
