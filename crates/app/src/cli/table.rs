use std::ops::Range;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

/// Render rows under `header`, right-aligning the `amounts` columns.
pub(crate) fn render<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
    amounts: Range<usize>,
) -> String {
    let mut builder = Builder::default();

    builder.push_record(header.map(str::to_string));

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(amounts), Alignment::right());

    table.to_string()
}
