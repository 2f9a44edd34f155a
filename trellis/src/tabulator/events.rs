//! Native callback slots and the custom DOM events they map to.

use std::fmt;

/// One native table callback.
///
/// Every variant corresponds to a callback key of the native options and to
/// a custom DOM event dispatched on the host element by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableEvent {
    RowClick,
    RowDblClick,
    RowSelectionChanged,
    RowSelected,
    RowDeselected,
    CellClick,
    CellDblClick,
    CellEditing,
    CellEdited,
    CellEditCancelled,
    DataLoading,
    DataLoaded,
    DataEdited,
}

impl TableEvent {
    pub const ALL: [TableEvent; 13] = [
        TableEvent::RowClick,
        TableEvent::RowDblClick,
        TableEvent::RowSelectionChanged,
        TableEvent::RowSelected,
        TableEvent::RowDeselected,
        TableEvent::CellClick,
        TableEvent::CellDblClick,
        TableEvent::CellEditing,
        TableEvent::CellEdited,
        TableEvent::CellEditCancelled,
        TableEvent::DataLoading,
        TableEvent::DataLoaded,
        TableEvent::DataEdited,
    ];

    /// Key of the callback in the native options.
    pub fn callback_key(self) -> &'static str {
        match self {
            Self::RowClick => "rowClick",
            Self::RowDblClick => "rowDblClick",
            Self::RowSelectionChanged => "rowSelectionChanged",
            Self::RowSelected => "rowSelected",
            Self::RowDeselected => "rowDeselected",
            Self::CellClick => "cellClick",
            Self::CellDblClick => "cellDblClick",
            Self::CellEditing => "cellEditing",
            Self::CellEdited => "cellEdited",
            Self::CellEditCancelled => "cellEditCancelled",
            Self::DataLoading => "dataLoading",
            Self::DataLoaded => "dataLoaded",
            Self::DataEdited => "dataEdited",
        }
    }

    /// Name of the custom DOM event dispatched on the host element.
    pub fn dom_event_name(self) -> &'static str {
        match self {
            Self::RowClick => "tabulatorRowClick",
            Self::RowDblClick => "tabulatorRowDblClick",
            Self::RowSelectionChanged => "tabulatorRowSelectionChanged",
            Self::RowSelected => "tabulatorRowSelected",
            Self::RowDeselected => "tabulatorRowDeselected",
            Self::CellClick => "tabulatorCellClick",
            Self::CellDblClick => "tabulatorCellDblClick",
            Self::CellEditing => "tabulatorCellEditing",
            Self::CellEdited => "tabulatorCellEdited",
            Self::CellEditCancelled => "tabulatorCellEditCancelled",
            Self::DataLoading => "tabulatorDataLoading",
            Self::DataLoaded => "tabulatorDataLoaded",
            Self::DataEdited => "tabulatorDataEdited",
        }
    }

    pub fn from_callback_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.callback_key() == key)
    }
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_names_are_prefixed_callback_keys() {
        for event in TableEvent::ALL {
            let key = event.callback_key();
            let mut expected = String::from("tabulator");
            expected.push_str(&key[..1].to_uppercase());
            expected.push_str(&key[1..]);
            assert_eq!(event.dom_event_name(), expected);
            assert_eq!(TableEvent::from_callback_key(key), Some(event));
        }
    }
}
