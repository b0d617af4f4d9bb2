use crate::foundation::core::{Point, Rect};
use crate::render::draw::element_bounds;
use crate::scene::model::{ActionDef, ElementBody, ElementDef};

/// Remote-control direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl std::str::FromStr for Direction {
    type Err = crate::foundation::error::StagecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(crate::foundation::error::StagecastError::config(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusConfig {
    /// Centres closer than this vertically share a row.
    pub row_threshold_px: f64,
    /// A candidate must lie beyond this distance in the requested direction.
    pub dead_zone_px: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            row_threshold_px: 50.0,
            dead_zone_px: 20.0,
        }
    }
}

/// One focusable element.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusCandidate {
    pub id: String,
    /// Device-space bounds.
    pub rect: Rect,
    pub center: Point,
    pub action: Option<ActionDef>,
}

/// Spatial focus over the interactive elements of a scene.
#[derive(Clone, Debug, Default)]
pub struct FocusNavigator {
    config: FocusConfig,
    items: Vec<FocusCandidate>,
    focused: Option<usize>,
}

impl FocusNavigator {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            focused: None,
        }
    }

    /// Collect visible interactive elements in reading order and focus the first one.
    ///
    /// Returns the number of candidates.
    pub fn initialize_navigation(&mut self, elements: &[ElementDef]) -> usize {
        let mut items: Vec<FocusCandidate> = elements
            .iter()
            .filter(|e| e.visible && e.kind().is_interactive())
            .map(|e| {
                let rect = element_bounds(e);
                FocusCandidate {
                    id: e.id.clone(),
                    rect,
                    center: rect.center(),
                    action: match &e.body {
                        ElementBody::Action(b) | ElementBody::Button(b) | ElementBody::Card(b) => {
                            b.action.clone()
                        }
                        _ => None,
                    },
                }
            })
            .collect();
        sort_reading_order(&mut items, self.config.row_threshold_px);
        self.focused = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        self.items.len()
    }

    pub fn candidates(&self) -> &[FocusCandidate] {
        &self.items
    }

    pub fn focused_element(&self) -> Option<&FocusCandidate> {
        self.focused.and_then(|i| self.items.get(i))
    }

    /// Focus `id` directly. Returns `false` for unknown ids.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.items.iter().position(|c| c.id == id) {
            Some(i) => {
                self.focused = Some(i);
                true
            }
            None => false,
        }
    }

    /// Move to the nearest candidate in `dir`. Returns `false` (focus unchanged) when there is
    /// none.
    pub fn move_focus(&mut self, dir: Direction) -> bool {
        let Some(cur) = self.focused_element().map(|c| c.center) else {
            return false;
        };
        let dz = self.config.dead_zone_px;
        let best = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.focused)
            .filter(|(_, c)| {
                let p = c.center;
                match dir {
                    Direction::Down => p.y - cur.y > dz,
                    Direction::Up => cur.y - p.y > dz,
                    Direction::Right => p.x - cur.x > dz,
                    Direction::Left => cur.x - p.x > dz,
                }
            })
            .min_by(|(_, a), (_, b)| a.center.distance(cur).total_cmp(&b.center.distance(cur)))
            .map(|(i, _)| i);
        match best {
            Some(i) => {
                self.focused = Some(i);
                true
            }
            None => false,
        }
    }

    /// Action bound to the focused element.
    pub fn execute_action(&self) -> Option<ActionDef> {
        self.focused_element().and_then(|c| c.action.clone())
    }

    pub fn cleanup(&mut self) {
        self.items.clear();
        self.focused = None;
    }
}

/// Top-to-bottom rows, left-to-right within a row. A row is anchored at its topmost centre.
fn sort_reading_order(items: &mut Vec<FocusCandidate>, row_threshold: f64) {
    items.sort_by(|a, b| {
        a.center
            .y
            .total_cmp(&b.center.y)
            .then(a.center.x.total_cmp(&b.center.x))
    });
    let mut rows: Vec<Vec<FocusCandidate>> = Vec::new();
    let mut anchor = f64::NEG_INFINITY;
    for item in items.drain(..) {
        match rows.last_mut() {
            Some(row) if item.center.y - anchor <= row_threshold => row.push(item),
            _ => {
                anchor = item.center.y;
                rows.push(vec![item]);
            }
        }
    }
    for mut row in rows {
        row.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
        items.extend(row);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/navigation/focus.rs"]
mod tests;
