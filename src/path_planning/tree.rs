//! Vertex/edge store for rapidly-exploring random trees

use ordered_float::OrderedFloat;

use crate::common::{Configuration, MotionTree, Point2D};

/// Tree vertex
#[derive(Debug, Clone)]
pub struct TreeVertex {
    pub configuration: Configuration,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Tree stored as a flat vertex list with exact, linear nearest-neighbor search
#[derive(Debug, Clone, Default)]
pub struct VecTree {
    vertices: Vec<TreeVertex>,
}

impl VecTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding only `root`
    pub fn with_root(root: Configuration) -> Self {
        let mut tree = Self::new();
        tree.insert_vertex(root);
        tree
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, id: usize) -> Option<&TreeVertex> {
        self.vertices.get(id)
    }

    pub fn vertices(&self) -> &[TreeVertex] {
        &self.vertices
    }

    /// Configurations from the root down to `id`
    pub fn path_to(&self, id: usize) -> Vec<Configuration> {
        let mut path = Vec::new();
        let mut current = if id < self.vertices.len() { Some(id) } else { None };
        while let Some(index) = current {
            let vertex = &self.vertices[index];
            path.push(vertex.configuration);
            current = vertex.parent;
        }
        path.reverse();
        path
    }
}

impl MotionTree for VecTree {
    fn insert_vertex(&mut self, configuration: Configuration) -> usize {
        self.vertices.push(TreeVertex {
            configuration,
            parent: None,
            children: Vec::new(),
        });
        self.vertices.len() - 1
    }

    fn insert_edge(&mut self, parent: usize, child: usize) -> bool {
        if parent >= self.vertices.len() || child >= self.vertices.len() || parent == child {
            return false;
        }
        // no cycles: child must not be an ancestor of parent
        let mut ancestor = Some(parent);
        while let Some(index) = ancestor {
            if index == child {
                return false;
            }
            ancestor = self.vertices[index].parent;
        }
        if let Some(old) = self.vertices[child].parent {
            self.vertices[old].children.retain(|&c| c != child);
        }
        self.vertices[child].parent = Some(parent);
        self.vertices[parent].children.push(child);
        true
    }

    fn nearest_neighbor(&self, point: Point2D) -> Option<usize> {
        self.vertices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| OrderedFloat(v.configuration.position().distance(&point)))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = VecTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.nearest_neighbor(Point2D::origin()), None);
    }

    #[test]
    fn test_nearest_neighbor() {
        let mut tree = VecTree::with_root(Configuration::from_cartesian(0.0, 0.0, 0.0));
        let a = tree.insert_vertex(Configuration::from_cartesian(5.0, 0.0, 0.0));
        let b = tree.insert_vertex(Configuration::from_cartesian(0.0, 5.0, 0.0));
        assert!(tree.insert_edge(0, a));
        assert!(tree.insert_edge(a, b));

        assert_eq!(tree.nearest_neighbor(Point2D::new(4.0, 1.0)), Some(a));
        assert_eq!(tree.nearest_neighbor(Point2D::new(-1.0, 4.0)), Some(b));
        assert_eq!(tree.nearest_neighbor(Point2D::new(0.5, 0.5)), Some(0));
    }

    #[test]
    fn test_edges_and_path() {
        let mut tree = VecTree::with_root(Configuration::from_cartesian(1.0, 0.0, 0.0));
        let a = tree.insert_vertex(Configuration::from_cartesian(2.0, 0.0, 0.0));
        let b = tree.insert_vertex(Configuration::from_cartesian(3.0, 0.0, 0.0));
        assert!(tree.insert_edge(0, a));
        assert!(tree.insert_edge(a, b));
        assert!(!tree.insert_edge(0, 42));
        assert!(!tree.insert_edge(a, a));
        assert!(!tree.insert_edge(b, 0));

        let path = tree.path_to(b);
        assert_eq!(path.len(), 3);
        assert!((path[2].position().x - 3.0).abs() < 1e-12);

        // rewire b under the root
        assert!(tree.insert_edge(0, b));
        assert_eq!(tree.vertex(b).unwrap().parent, Some(0));
        assert!(tree.vertex(a).unwrap().children.is_empty());
        assert_eq!(tree.path_to(b).len(), 2);
    }
}
