use crate::records::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnId {
    Selection,
    Data(Field),
}

#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    pub label: &'static str,
    pub visible: bool,
    pub sortable: bool,
}

// The table layout of the records overview, selection checkbox first.
const STANDARD_COLUMNS: [(Field, bool); 8] = [
    (Field::Id, true),
    (Field::SchemeName, true),
    (Field::UniqueId, true),
    (Field::OwnerName, true),
    (Field::Category, true),
    (Field::PlotNumber, false),
    (Field::RegistrationAmount, true),
    (Field::RegistrationDate, false),
];

/// Ordered set of displayable columns. The selection column is pinned
/// first and can neither be hidden nor sorted on.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<Column>,
}

impl ColumnRegistry {
    pub fn standard() -> Self {
        Self::from_fields(&STANDARD_COLUMNS)
    }

    pub fn from_fields(fields: &[(Field, bool)]) -> Self {
        let mut columns = vec![Column {
            id: ColumnId::Selection,
            label: "",
            visible: true,
            sortable: false,
        }];
        for &(field, sortable) in fields {
            columns.push(Column {
                id: ColumnId::Data(field),
                label: field.label(),
                visible: true,
                sortable,
            });
        }
        ColumnRegistry { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    // Visible data columns with their backing field, in registry order.
    pub fn visible_data(&self) -> impl Iterator<Item = (Field, &Column)> {
        self.columns.iter().filter_map(|c| match c.id {
            ColumnId::Data(field) if c.visible => Some((field, c)),
            _ => None,
        })
    }

    pub fn data_columns(&self) -> impl Iterator<Item = (Field, &Column)> {
        self.columns.iter().filter_map(|c| match c.id {
            ColumnId::Data(field) => Some((field, c)),
            _ => None,
        })
    }

    // Flips one column; the selection column is exempt.
    pub fn toggle_visibility(&mut self, id: ColumnId) -> bool {
        if id == ColumnId::Selection {
            return false;
        }
        match self.columns.iter_mut().find(|c| c.id == id) {
            Some(column) => {
                column.visible = !column.visible;
                true
            }
            None => false,
        }
    }
}
