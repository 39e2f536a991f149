use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::tree::{DirectoryTree, NodeId, TreeNode};
use crate::presentation::PresentationProvider;

/// Tree widget that renders the directory tree with box-drawing characters.
pub struct TreeWidget<'a> {
    tree: &'a DirectoryTree,
    presentation: &'a dyn PresentationProvider,
    cursor: Option<NodeId>,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a DirectoryTree, presentation: &'a dyn PresentationProvider) -> Self {
        Self {
            tree,
            presentation,
            cursor: None,
            focused: false,
            block: None,
        }
    }

    pub fn cursor(mut self, cursor: Option<NodeId>, focused: bool) -> Self {
        self.cursor = cursor;
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn is_last_sibling(&self, id: NodeId) -> bool {
        self.tree
            .parent(id)
            .map(|p| self.tree.children(p).last() == Some(&id))
            .unwrap_or(true)
    }

    /// Indentation for a row, drawn from the ancestor chain.
    fn build_prefix(&self, id: NodeId, depth: usize) -> String {
        if depth == 0 {
            return String::new();
        }

        // Ancestors between the filesystem root and this node, nearest first.
        let mut ancestors = Vec::with_capacity(depth);
        let mut next = self.tree.parent(id);
        while ancestors.len() + 1 < depth {
            match next {
                Some(a) => {
                    ancestors.push(a);
                    next = self.tree.parent(a);
                }
                None => break,
            }
        }

        let mut prefix = String::new();
        for &ancestor in ancestors.iter().rev() {
            prefix.push_str(if self.is_last_sibling(ancestor) {
                "   "
            } else {
                "│  "
            });
        }
        prefix.push_str(if self.is_last_sibling(id) {
            "└──"
        } else {
            "├──"
        });
        prefix
    }

    fn expansion_marker(node: &TreeNode) -> &'static str {
        if node.pending {
            "… "
        } else if !node.children_loaded {
            "▸ "
        } else if node.children.is_empty() {
            "  "
        } else {
            "▾ "
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let rows = self.tree.visible_rows();
        let visible_height = inner_area.height as usize;
        if rows.is_empty() || visible_height == 0 {
            return;
        }

        let cursor_row = self
            .cursor
            .and_then(|c| rows.iter().position(|&(id, _)| id == c))
            .unwrap_or(0);
        let scroll = (cursor_row + 1).saturating_sub(visible_height);

        for (i, &(id, depth)) in rows.iter().skip(scroll).take(visible_height).enumerate() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            let y = inner_area.y + i as u16;

            let style = if i + scroll == cursor_row {
                let style = Style::default().add_modifier(Modifier::BOLD);
                if self.focused {
                    style.bg(Color::Blue).fg(Color::White)
                } else {
                    style.add_modifier(Modifier::REVERSED)
                }
            } else {
                Style::default().fg(Color::Cyan)
            };

            let line = Line::from(vec![
                Span::raw(self.build_prefix(id, depth)),
                Span::raw(Self::expansion_marker(node)),
                Span::styled(
                    format!(
                        "{}{}",
                        self.presentation.icon_for_entry(&node.entry).glyph(),
                        self.presentation.display_name_for(&node.entry.path)
                    ),
                    style,
                ),
            ]);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
