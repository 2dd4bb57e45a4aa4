use scraper::{ElementRef, Html, Selector};

use crate::errors::ExtractError;

/// Which cells of a row count as columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellScope {
    /// `<td>` cells only; the row header `<th>` is not a column.
    Data,
    /// Every element child of the row, `<th>` included.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TableGrid {
    label: String,
    rows: Vec<Vec<Cell>>,
}

impl TableGrid {
    /// Grid of every `<tr>` under the element with `id`, header rows included.
    pub fn by_id(doc: &Html, id: &str, scope: CellScope) -> Result<Self, ExtractError> {
        let table = find_by_id(doc, id)?;
        Self::from_element(table, id, scope)
    }

    /// Grid of the first `<tfoot>` in the document.
    pub fn footer(doc: &Html, label: &str, scope: CellScope) -> Result<Self, ExtractError> {
        let sel = selector("tfoot")?;
        let tfoot = doc
            .select(&sel)
            .next()
            .ok_or_else(|| ExtractError::MissingTable(format!("{label} tfoot")))?;
        Self::from_element(tfoot, label, scope)
    }

    pub fn from_element(
        element: ElementRef<'_>,
        label: &str,
        scope: CellScope,
    ) -> Result<Self, ExtractError> {
        let tr = selector("tr")?;
        let td = selector("td")?;
        let link = selector("a")?;
        let rows = element
            .select(&tr)
            .map(|row| match scope {
                CellScope::Data => row.select(&td).map(|cell| read_cell(cell, &link)).collect(),
                CellScope::All => row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .map(|cell| read_cell(cell, &link))
                    .collect(),
            })
            .collect();
        Ok(Self {
            label: label.to_string(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> Result<&[Cell], ExtractError> {
        self.rows
            .get(row)
            .map(Vec::as_slice)
            .ok_or_else(|| ExtractError::MissingRow {
                table: self.label.clone(),
                row,
            })
    }

    /// Rows after the first `skip`, with their absolute index.
    pub fn rows_from(&self, skip: usize) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell, ExtractError> {
        self.row(row)?
            .get(col)
            .ok_or_else(|| ExtractError::MissingCell {
                table: self.label.clone(),
                row,
                col,
            })
    }

    pub fn text(&self, row: usize, col: usize) -> Result<&str, ExtractError> {
        Ok(self.cell(row, col)?.text.as_str())
    }

    pub fn int(&self, row: usize, col: usize) -> Result<i64, ExtractError> {
        let text = self.text(row, col)?;
        text.parse::<i64>().map_err(|_| self.bad_number(row, col, text))
    }

    pub fn float(&self, row: usize, col: usize) -> Result<f64, ExtractError> {
        let text = self.text(row, col)?;
        text.parse::<f64>().map_err(|_| self.bad_number(row, col, text))
    }

    fn bad_number(&self, row: usize, col: usize, text: &str) -> ExtractError {
        ExtractError::BadNumber {
            table: self.label.clone(),
            row,
            col,
            text: text.to_string(),
        }
    }
}

/// Parse the first comment inside the element with `container_id` as an HTML
/// fragment of its own.
pub fn unwrap_fragment(doc: &Html, container_id: &str) -> Result<Html, ExtractError> {
    let container = find_by_id(doc, container_id)?;
    container
        .descendants()
        .find_map(|node| node.value().as_comment().map(|c| Html::parse_fragment(c)))
        .ok_or_else(|| ExtractError::MissingFragment(container_id.to_string()))
}

pub fn find_by_id<'a>(doc: &'a Html, id: &str) -> Result<ElementRef<'a>, ExtractError> {
    let sel = selector(&format!("[id=\"{id}\"]"))?;
    doc.select(&sel)
        .next()
        .ok_or_else(|| ExtractError::MissingTable(id.to_string()))
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

fn read_cell(element: ElementRef<'_>, link: &Selector) -> Cell {
    let text = element.text().collect::<String>().trim().to_string();
    let href = element
        .select(link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);
    Cell { text, href }
}
