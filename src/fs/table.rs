use std::sync::Arc;
use std::time::SystemTime;

use crate::error::RowOutOfRange;
use crate::fs::entry::PathEntry;
use crate::fs::lister::ListingSnapshot;
use crate::presentation::{IconHandle, PresentationProvider};

/// Table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Icon,
    DisplayName,
    Path,
    Size,
    LastModified,
    Readable,
    Writable,
    Executable,
    IsDirectory,
    IsFile,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Icon,
        Column::DisplayName,
        Column::Path,
        Column::Size,
        Column::LastModified,
        Column::Readable,
        Column::Writable,
        Column::Executable,
        Column::IsDirectory,
        Column::IsFile,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Icon => "Icon",
            Column::DisplayName => "File",
            Column::Path => "Path/name",
            Column::Size => "Size",
            Column::LastModified => "Last Modified",
            Column::Readable => "R",
            Column::Writable => "W",
            Column::Executable => "E",
            Column::IsDirectory => "D",
            Column::IsFile => "F",
        }
    }

    /// Cycle to the next column (wraps around).
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// A single cell, typed by column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellValue {
    Icon(IconHandle),
    Text(String),
    Size(u64),
    Time(Option<SystemTime>),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Row-indexed projection of the most recent listing.
///
/// Model row `i` is `snapshot.all_entries[i]` until the next [`load`]. Sorting
/// only permutes the view order; [`entry_at`] always uses model rows.
///
/// [`load`]: ListingTable::load
/// [`entry_at`]: ListingTable::entry_at
#[derive(Debug, Default)]
pub struct ListingTable {
    snapshot: Option<Arc<ListingSnapshot>>,
    view: Vec<usize>,
    sort: Option<(Column, SortDirection)>,
    selected_view_row: Option<usize>,
}

impl ListingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with the entries of `snapshot`.
    ///
    /// Any row selection refers to the old rows and is cleared. The active
    /// sort, if any, is re-applied to the new rows.
    pub fn load(&mut self, snapshot: Arc<ListingSnapshot>, presentation: &dyn PresentationProvider) {
        self.view = (0..snapshot.all_entries.len()).collect();
        self.snapshot = Some(snapshot);
        self.selected_view_row = None;
        if let Some((column, direction)) = self.sort {
            self.sort_by(column, direction, presentation);
        }
    }

    pub fn row_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|s| s.all_entries.len())
            .unwrap_or(0)
    }

    /// The entry at model row `row`.
    pub fn entry_at(&self, row: usize) -> Result<&PathEntry, RowOutOfRange> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.all_entries.get(row))
            .ok_or(RowOutOfRange {
                row,
                len: self.row_count(),
            })
    }

    /// The directory the rows came from.
    pub fn directory(&self) -> Option<&PathEntry> {
        self.snapshot.as_ref().map(|s| &s.directory_entry)
    }

    pub fn snapshot(&self) -> Option<&Arc<ListingSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn cell(
        &self,
        row: usize,
        column: Column,
        presentation: &dyn PresentationProvider,
    ) -> Result<CellValue, RowOutOfRange> {
        self.entry_at(row)
            .map(|entry| Self::cell_for(entry, column, presentation))
    }

    fn cell_for(entry: &PathEntry, column: Column, presentation: &dyn PresentationProvider) -> CellValue {
        match column {
            Column::Icon => CellValue::Icon(presentation.icon_for_entry(entry)),
            Column::DisplayName => CellValue::Text(presentation.display_name_for(&entry.path)),
            Column::Path => CellValue::Text(entry.path.to_string_lossy().to_string()),
            Column::Size => CellValue::Size(entry.size_bytes),
            Column::LastModified => CellValue::Time(entry.last_modified),
            Column::Readable => CellValue::Flag(entry.can_read),
            Column::Writable => CellValue::Flag(entry.can_write),
            Column::Executable => CellValue::Flag(entry.can_execute),
            Column::IsDirectory => CellValue::Flag(entry.is_directory),
            Column::IsFile => CellValue::Flag(entry.is_regular_file),
        }
    }

    /// Reorder the view by `column`. Stable, so equal cells keep listing order.
    pub fn sort_by(
        &mut self,
        column: Column,
        direction: SortDirection,
        presentation: &dyn PresentationProvider,
    ) {
        self.sort = Some((column, direction));
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let keys: Vec<CellValue> = snapshot
            .all_entries
            .iter()
            .map(|e| Self::cell_for(e, column, presentation))
            .collect();
        self.view.sort_by(|&a, &b| {
            let ord = keys[a].cmp(&keys[b]);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        self.selected_view_row = None;
    }

    /// Drop any sort and show rows in listing order again.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.view = (0..self.row_count()).collect();
        self.selected_view_row = None;
    }

    pub fn sort(&self) -> Option<(Column, SortDirection)> {
        self.sort
    }

    /// Model row shown at `view_row`.
    pub fn view_to_model(&self, view_row: usize) -> Option<usize> {
        self.view.get(view_row).copied()
    }

    /// Model rows in view order.
    pub fn view_rows(&self) -> &[usize] {
        &self.view
    }

    pub fn selected_view_row(&self) -> Option<usize> {
        self.selected_view_row
    }

    /// Highlight `view_row`, returning the model row it maps to.
    pub fn select_view_row(&mut self, view_row: usize) -> Option<usize> {
        let model = self.view_to_model(view_row)?;
        self.selected_view_row = Some(view_row);
        Some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::lister::{DirectoryLister, ListingOrder};
    use crate::presentation::SystemPresentation;
    use std::fs;
    use tempfile::TempDir;

    fn presentation() -> SystemPresentation {
        SystemPresentation::new(false)
    }

    fn snapshot_of(dir: &TempDir) -> Arc<ListingSnapshot> {
        let lister = DirectoryLister::new(
            Arc::new(presentation()),
            false,
            ListingOrder::DisplayName,
        );
        Arc::new(lister.list(dir.path()).unwrap())
    }

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.bin"), vec![0u8; 4096]).unwrap();
        fs::write(dir.path().join("small.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("folder")).unwrap();
        dir
    }

    #[test]
    fn column_titles_match_fixed_order() {
        let titles: Vec<&str> = Column::ALL.iter().map(|c| c.title()).collect();
        assert_eq!(
            titles,
            vec!["Icon", "File", "Path/name", "Size", "Last Modified", "R", "W", "E", "D", "F"]
        );
    }

    #[test]
    fn empty_table_has_no_rows() {
        let table = ListingTable::new();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.entry_at(0), Err(RowOutOfRange { row: 0, len: 0 }));
        assert!(table.directory().is_none());
    }

    #[test]
    fn load_maps_rows_to_entries() {
        let dir = setup();
        let snapshot = snapshot_of(&dir);
        let mut table = ListingTable::new();
        table.load(snapshot.clone(), &presentation());

        assert_eq!(table.row_count(), snapshot.all_entries.len());
        for (i, entry) in snapshot.all_entries.iter().enumerate() {
            assert_eq!(table.entry_at(i).unwrap(), entry);
        }
        assert_eq!(table.directory().unwrap().path, dir.path());
    }

    #[test]
    fn entry_at_out_of_range() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());
        assert_eq!(table.entry_at(3), Err(RowOutOfRange { row: 3, len: 3 }));
    }

    #[test]
    fn sorting_does_not_change_entry_at() {
        let dir = setup();
        let snapshot = snapshot_of(&dir);
        let mut table = ListingTable::new();
        table.load(snapshot.clone(), &presentation());

        table.sort_by(Column::Size, SortDirection::Descending, &presentation());
        for (i, entry) in snapshot.all_entries.iter().enumerate() {
            assert_eq!(table.entry_at(i).unwrap(), entry);
        }
        let first = table.view_to_model(0).unwrap();
        assert_eq!(table.entry_at(first).unwrap().name(), "big.bin");
    }

    #[test]
    fn sort_by_directory_flag_puts_directories_first() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());

        table.sort_by(Column::IsDirectory, SortDirection::Descending, &presentation());
        let first = table.view_to_model(0).unwrap();
        assert!(table.entry_at(first).unwrap().is_directory);
    }

    #[test]
    fn load_clears_selection_and_keeps_sort() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());
        table.sort_by(Column::Size, SortDirection::Descending, &presentation());
        table.select_view_row(1);
        assert_eq!(table.selected_view_row(), Some(1));

        table.load(snapshot_of(&dir), &presentation());
        assert_eq!(table.selected_view_row(), None);
        let first = table.view_to_model(0).unwrap();
        assert_eq!(table.entry_at(first).unwrap().name(), "big.bin");
    }

    #[test]
    fn clear_sort_restores_listing_order() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());
        table.sort_by(Column::Size, SortDirection::Descending, &presentation());
        table.clear_sort();
        assert_eq!(table.view_rows(), &[0, 1, 2]);
        assert!(table.sort().is_none());
    }

    #[test]
    fn cells_follow_columns() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());
        let p = presentation();

        // Listing order: big.bin, folder, small.txt
        assert_eq!(
            table.cell(1, Column::DisplayName, &p).unwrap(),
            CellValue::Text("folder".into())
        );
        assert_eq!(table.cell(1, Column::IsDirectory, &p).unwrap(), CellValue::Flag(true));
        assert_eq!(table.cell(1, Column::Size, &p).unwrap(), CellValue::Size(0));
        assert_eq!(table.cell(2, Column::Size, &p).unwrap(), CellValue::Size(1));
        assert_eq!(table.cell(2, Column::IsFile, &p).unwrap(), CellValue::Flag(true));
        assert_eq!(table.cell(0, Column::Icon, &p).unwrap(), CellValue::Icon(IconHandle("[F] ")));
        assert!(table.cell(9, Column::Path, &p).is_err());
    }

    #[test]
    fn select_view_row_maps_through_sort() {
        let dir = setup();
        let mut table = ListingTable::new();
        table.load(snapshot_of(&dir), &presentation());
        table.sort_by(Column::DisplayName, SortDirection::Descending, &presentation());
        // small.txt, folder, big.bin
        assert_eq!(table.select_view_row(0), Some(2));
        assert_eq!(table.select_view_row(7), None);
    }

    #[test]
    fn column_next_wraps() {
        assert_eq!(Column::Icon.next(), Column::DisplayName);
        assert_eq!(Column::IsFile.next(), Column::Icon);
    }
}
