//! Table layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! A fixed grid: every `td` is [`CELL_WIDTH`] wide, cells of a row share the
//! row's top edge, and the row is as tall as its tallest cell. There is no
//! column sizing, spanning, or `th`.
//!
//! The grid only summarizes each cell. The walk still visits the elements
//! inside the table afterwards, so a `p` or `img` in a cell is laid out again
//! below the grid.

use chimera_common::warning::warn_once;
use chimera_dom::{DomTree, NodeId};

use crate::command::{ImageRef, RenderCommand, TableCellCommand};
use crate::engine::{CELL_WIDTH, LayoutPass, checked_node};
use crate::error::LayoutError;
use crate::style;

/// Row groups whose `tr` children count as rows of the table.
const ROW_GROUPS: &[&str] = &["thead", "tbody", "tfoot"];

fn is_element(dom: &DomTree, id: NodeId, tag_name: &str) -> bool {
    dom.as_element(id).is_some_and(|e| e.is(tag_name))
}

/// Rows of `table` in document order.
fn rows(dom: &DomTree, table: NodeId) -> Result<Vec<NodeId>, LayoutError> {
    let mut rows = Vec::new();
    for &child in dom.children(table) {
        let _ = checked_node(dom, child)?;
        if is_element(dom, child, "tr") {
            rows.push(child);
        } else if dom
            .as_element(child)
            .is_some_and(|e| ROW_GROUPS.contains(&e.tag_name.as_str()))
        {
            for &grandchild in dom.children(child) {
                let _ = checked_node(dom, grandchild)?;
                if is_element(dom, grandchild, "tr") {
                    rows.push(grandchild);
                }
            }
        }
    }
    Ok(rows)
}

/// `td` children of `row`.
fn cells(dom: &DomTree, row: NodeId) -> Result<Vec<NodeId>, LayoutError> {
    let mut cells = Vec::new();
    for &child in dom.children(row) {
        let _ = checked_node(dom, child)?;
        if is_element(dom, child, "td") {
            cells.push(child);
        }
    }
    Ok(cells)
}

impl LayoutPass<'_, '_> {
    /// Lay out a table at the cursor and move the cursor below it.
    ///
    /// A table without rows or cells only adds the trailing margin.
    pub(crate) fn layout_table(&mut self, dom: &DomTree, table: NodeId) -> Result<(), LayoutError> {
        for row in rows(dom, table)? {
            let row_x = self.cursor_x;
            let row_top = self.cursor_y;
            let mut row_height = 0.0_f32;

            for (column, cell) in cells(dom, row)?.into_iter().enumerate() {
                let x = row_x + column as f32 * CELL_WIDTH;
                let command = self.layout_cell(dom, cell, x, row_top + self.margin);
                row_height = row_height.max(command.height);
                self.commands.push(RenderCommand::TableCell(command));
            }
            self.cursor_y += row_height;
        }
        self.cursor_y += self.margin;
        Ok(())
    }

    fn layout_cell(&mut self, dom: &DomTree, cell: NodeId, x: f32, y: f32) -> TableCellCommand {
        let style = style::lookup("td");

        if dom.find_first(cell, "table").is_some() {
            let _ = warn_once("layout", "nested <table> text also joins the outer cell");
        }

        let content = dom.text_content(cell);
        let text = content.trim().to_string();
        let text_height = if text.is_empty() {
            0.0
        } else {
            match self.measurer.line_height(&style.font) {
                Ok(line_height) => line_height + self.margin,
                // The cell stays so later columns keep their x positions.
                Err(source) => {
                    self.record(LayoutError::MeasurementFailure {
                        tag: "td".to_string(),
                        source,
                    });
                    0.0
                }
            }
        };

        let image = self.cell_image(dom, cell);
        let image_height = image.map_or(0.0, |image| image.height as f32 + self.margin);

        TableCellCommand {
            tag: "td".to_string(),
            x,
            y,
            width: CELL_WIDTH,
            height: text_height.max(image_height) + 2.0 * self.margin,
            text,
            font: style.font,
            color: style.color,
            image,
            border: true,
        }
    }

    /// The first `img` anywhere in the cell, if it resolves.
    fn cell_image(&mut self, dom: &DomTree, cell: NodeId) -> Option<ImageRef> {
        let img = dom.find_first(cell, "img")?;
        let Some(src) = dom
            .attribute(img, "src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
        else {
            self.record(LayoutError::ImageResolutionFailure {
                url: String::new(),
                detail: "missing src".to_string(),
            });
            return None;
        };
        match self.resolve_image(src) {
            Ok(image) => Some(image),
            Err(err) => {
                self.record(err);
                None
            }
        }
    }
}
