use crate::errors::{TinderError, TinderResult};
use crate::window::mapper::CoordinateMapper;
use crate::window::source::WindowSource;
use crate::window::store::RegionStore;
use crate::window::types::{Region, WindowNode};

/// Finds the target application's window and keeps its region.
pub struct WindowLocator {
    source: Box<dyn WindowSource>,
    store: RegionStore,
    title_pattern: String,
    region: Option<Region>,
}

impl WindowLocator {
    /// Cache-first: a usable persisted region wins over a fresh window query.
    /// A failed detection leaves the locator not ready; it never panics or errors.
    pub fn new(source: Box<dyn WindowSource>, store: RegionStore, title_pattern: impl Into<String>) -> Self {
        let mut locator = Self {
            source,
            store,
            title_pattern: title_pattern.into(),
            region: None,
        };

        match locator.store.load() {
            Ok(Some(region)) if region.is_ready() => {
                tracing::info!(
                    x = region.x, y = region.y,
                    width = region.width, height = region.height,
                    title = %region.title,
                    "using persisted window region"
                );
                locator.region = Some(region);
                return locator;
            }
            Ok(Some(region)) => {
                tracing::warn!(width = region.width, height = region.height, "persisted region is empty, detecting");
            }
            Ok(None) => tracing::debug!("no persisted window region, detecting"),
            Err(e) => tracing::warn!(error = %e, "could not read persisted region, detecting"),
        }

        if let Err(e) = locator.refresh() {
            tracing::warn!(error = %e, "window detection failed at startup");
        }
        locator
    }

    /// Query the window hierarchy and pick the best match. Does not touch
    /// the stored region.
    pub fn locate(&self) -> TinderResult<Region> {
        let tree = self.source.window_tree()?;
        let matches = find_matching_windows(&tree, &self.title_pattern);

        if matches.is_empty() {
            tracing::warn!(pattern = %self.title_pattern, "no matching window found");
            return Err(TinderError::WindowNotFound(format!(
                "no window title contains '{}'",
                self.title_pattern
            )));
        }

        for (i, m) in matches.iter().enumerate() {
            tracing::debug!(
                index = i + 1, title = %m.title,
                x = m.x, y = m.y, width = m.width, height = m.height,
                "candidate window"
            );
        }

        let count = matches.len();
        let best = select_largest(matches).ok_or_else(|| TinderError::WindowNotFound(self.title_pattern.clone()))?;
        tracing::info!(
            title = %best.title,
            x = best.x, y = best.y, width = best.width, height = best.height,
            candidates = count,
            "found window"
        );
        Ok(best)
    }

    /// Re-detect, keep and persist the region. On failure the previous
    /// region is discarded so callers see `is_ready() == false`.
    pub fn refresh(&mut self) -> TinderResult<Region> {
        tracing::info!(pattern = %self.title_pattern, "detecting window");
        match self.locate() {
            Ok(region) => {
                if let Err(e) = self.store.save(&region) {
                    tracing::warn!(error = %e, path = %self.store.path().display(), "failed to persist region");
                }
                self.region = Some(region.clone());
                Ok(region)
            }
            Err(e) => {
                self.region = None;
                Err(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.region.as_ref().is_some_and(Region::is_ready)
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.region.clone())
    }
}

/// Iterative pre-order walk collecting every window whose title contains
/// `pattern` (case-insensitive) and whose content rectangle is non-empty.
pub fn find_matching_windows(root: &WindowNode, pattern: &str) -> Vec<Region> {
    let needle = pattern.to_lowercase();
    let mut matches = Vec::new();
    let mut stack: Vec<&WindowNode> = vec![root];

    while let Some(node) = stack.pop() {
        if let (Some(title), Some(geometry)) = (&node.title, &node.geometry) {
            if title.to_lowercase().contains(&needle) && geometry.width > 0 && geometry.height > 0 {
                let (x, y) = geometry.content_origin();
                matches.push(Region {
                    x,
                    y,
                    width: geometry.width,
                    height: geometry.height,
                    title: title.clone(),
                });
            }
        }
        // reversed so children are visited in their natural order
        stack.extend(node.children.iter().rev());
    }

    matches
}

/// Largest area wins; the earliest match wins ties.
pub fn select_largest(matches: Vec<Region>) -> Option<Region> {
    matches.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.area() >= candidate.area() => Some(b),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::types::WindowGeometry;
    use std::cell::Cell;
    use std::rc::Rc;

    fn geo(x: i32, y: i32, width: i32, height: i32) -> WindowGeometry {
        WindowGeometry { x, y, width, height }
    }

    struct FixedTree {
        tree: WindowNode,
        queries: Rc<Cell<u32>>,
    }

    impl WindowSource for FixedTree {
        fn window_tree(&self) -> TinderResult<WindowNode> {
            self.queries.set(self.queries.get() + 1);
            Ok(self.tree.clone())
        }
    }

    fn locator_with(tree: WindowNode, store: RegionStore) -> (WindowLocator, Rc<Cell<u32>>) {
        let queries = Rc::new(Cell::new(0));
        let source = FixedTree {
            tree,
            queries: queries.clone(),
        };
        (WindowLocator::new(Box::new(source), store, "runelite"), queries)
    }

    fn sample_tree() -> WindowNode {
        WindowNode::root(vec![
            WindowNode::leaf("Terminal", geo(0, 0, 1920, 1080)),
            WindowNode::leaf("RuneLite launcher", geo(10, 10, 300, 200)).with_children(vec![
                WindowNode::leaf("RuneLite - Player", geo(-4, -28, 1280, 720)),
            ]),
            WindowNode::leaf("runelite (minimized)", geo(0, 0, 0, 0)),
        ])
    }

    #[test]
    fn traversal_is_preorder_and_filters_empty_windows() {
        let matches = find_matching_windows(&sample_tree(), "RUNELITE");
        let titles: Vec<_> = matches.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["RuneLite launcher", "RuneLite - Player"]);
        assert_eq!((matches[1].x, matches[1].y), (4, 28));
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let mut node = WindowNode::leaf("RuneLite", geo(0, 0, 10, 10));
        for depth in 0..10_000 {
            node = WindowNode::leaf(&format!("layer {depth}"), geo(0, 0, 1, 1)).with_children(vec![node]);
        }
        let matches = find_matching_windows(&node, "runelite");
        assert_eq!(matches.len(), 1);
        // avoid a recursive drop of the deep tree
        std::mem::forget(node);
    }

    #[test]
    fn largest_area_wins_and_first_wins_ties() {
        let region = |title: &str, w, h| Region {
            x: 0,
            y: 0,
            width: w,
            height: h,
            title: title.into(),
        };
        let best = select_largest(vec![
            region("a", 100, 100),
            region("b", 200, 50),
            region("c", 50, 200),
            region("d", 20, 20),
        ])
        .unwrap();
        assert_eq!(best.title, "a");

        let best = select_largest(vec![region("a", 10, 10), region("b", 30, 30)]).unwrap();
        assert_eq!(best.title, "b");
        assert!(select_largest(Vec::new()).is_none());
    }

    #[test]
    fn detection_persists_region() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::new(dir.path().join("window_config.json"));
        let (locator, queries) = locator_with(sample_tree(), store.clone());

        assert!(locator.is_ready());
        assert_eq!(queries.get(), 1);
        let region = locator.region().unwrap().clone();
        assert_eq!(region.title, "RuneLite - Player");
        assert_eq!(store.load().unwrap(), Some(region));
    }

    #[test]
    fn persisted_region_skips_detection() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::new(dir.path().join("window_config.json"));
        let cached = Region {
            x: 1,
            y: 2,
            width: 3,
            height: 4,
            title: "RuneLite cached".into(),
        };
        store.save(&cached).unwrap();

        let (mut locator, queries) = locator_with(sample_tree(), store);
        assert_eq!(queries.get(), 0);
        assert_eq!(locator.region(), Some(&cached));

        let fresh = locator.refresh().unwrap();
        assert_eq!(queries.get(), 1);
        assert_eq!(fresh.title, "RuneLite - Player");
    }

    #[test]
    fn no_match_leaves_locator_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::new(dir.path().join("window_config.json"));
        let tree = WindowNode::root(vec![WindowNode::leaf("Terminal", geo(0, 0, 800, 600))]);
        let (mut locator, _) = locator_with(tree, store.clone());

        assert!(!locator.is_ready());
        assert!(matches!(locator.refresh(), Err(TinderError::WindowNotFound(_))));
        assert!(locator.mapper().to_absolute(0, 0).is_err());
        assert_eq!(store.load().unwrap(), None);
    }
}
