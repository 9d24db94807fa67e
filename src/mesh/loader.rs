use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::{Mesh, MeshError, Triangle, Vertex};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot open file: {0}")]
    FileNotFound(String),
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },
    #[error("Node {id} at line {line} is already defined")]
    DuplicateNode { line: usize, id: u32 },
    #[error("Element at line {line} references unknown node {id}")]
    UnknownNode { line: usize, id: u32 },
    #[error("File contains no nodes or elements")]
    EmptyFile,
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Element corners by node id, resolved once all nodes are known.
struct PendingElement {
    line: usize,
    nodes: [u32; 3],
}

fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
    line: usize,
    what: &str,
) -> Result<T, LoadError> {
    let raw = fields.get(index).ok_or_else(|| LoadError::ParseError {
        line,
        message: format!("missing {}", what),
    })?;
    raw.parse().map_err(|_| LoadError::ParseError {
        line,
        message: format!("expected {}, got '{}'", what, raw),
    })
}

/// Load a mesh from a .2dm file
pub fn load_2dm<P: AsRef<Path>>(path: P) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|_| LoadError::FileNotFound(path.display().to_string()))?;

    parse_2dm_content(&content)
}

/// Parse .2dm content string (useful for testing)
///
/// Only `ND`, `E3T` and `E4Q` cards are interpreted; quads are split along
/// their first diagonal. Everything else is skipped.
pub fn parse_2dm_content(content: &str) -> Result<Mesh, LoadError> {
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut index_of: HashMap<u32, usize> = HashMap::new();
    let mut pending: Vec<PendingElement> = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_no = line_idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(&card) = fields.first() else {
            continue;
        };

        match card {
            "ND" => {
                let id: u32 = parse_field(&fields, 1, line_no, "node id")?;
                let x: f64 = parse_field(&fields, 2, line_no, "x coordinate")?;
                let y: f64 = parse_field(&fields, 3, line_no, "y coordinate")?;
                let z: f64 = parse_field(&fields, 4, line_no, "elevation")?;
                if ![x, y, z].iter().all(|v| v.is_finite()) {
                    return Err(LoadError::ParseError {
                        line: line_no,
                        message: format!("non-finite coordinate in node {}", id),
                    });
                }

                if index_of.insert(id, vertices.len()).is_some() {
                    return Err(LoadError::DuplicateNode { line: line_no, id });
                }
                vertices.push(Vertex::new(id, x, y, z));
            }
            "E3T" => {
                let mut nodes = [0u32; 3];
                for (i, node) in nodes.iter_mut().enumerate() {
                    *node = parse_field(&fields, i + 2, line_no, "node id")?;
                }
                pending.push(PendingElement {
                    line: line_no,
                    nodes,
                });
            }
            "E4Q" => {
                let mut nodes = [0u32; 4];
                for (i, node) in nodes.iter_mut().enumerate() {
                    *node = parse_field(&fields, i + 2, line_no, "node id")?;
                }
                pending.push(PendingElement {
                    line: line_no,
                    nodes: [nodes[0], nodes[1], nodes[2]],
                });
                pending.push(PendingElement {
                    line: line_no,
                    nodes: [nodes[0], nodes[2], nodes[3]],
                });
            }
            other => {
                log::trace!("Skipping card '{}' at line {}", other, line_no);
            }
        }
    }

    if vertices.is_empty() && pending.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut triangles = Vec::with_capacity(pending.len());
    for element in &pending {
        let mut corners = [0usize; 3];
        for (corner, &id) in corners.iter_mut().zip(element.nodes.iter()) {
            *corner = *index_of.get(&id).ok_or(LoadError::UnknownNode {
                line: element.line,
                id,
            })?;
        }
        triangles.push(Triangle { vertices: corners });
    }

    log::debug!(
        "Parsed 2dm: {} nodes, {} triangles",
        vertices.len(),
        triangles.len()
    );

    Ok(Mesh::new(vertices, triangles)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SINGLE_TRIANGLE: &str = "MESH2D\n\
        ND 1 0.0 0.0 10.0\n\
        ND 2 4.0 0.0 10.0\n\
        ND 3 0.0 4.0 20.0\n\
        E3T 1 1 2 3 1\n";

    #[test]
    fn test_parse_single_triangle() {
        let mesh = parse_2dm_content(SINGLE_TRIANGLE).unwrap();

        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.triangles().len(), 1);
        assert_eq!(mesh.triangles()[0].vertices, [0, 1, 2]);
        assert_eq!(mesh.vertices()[2].position.z, 20.0);
    }

    #[test]
    fn test_parse_ignores_unknown_cards() {
        let content = format!(
            "MESHNAME \"demo\"\nNUM_MATERIALS_PER_ELEM 1\n\n{}",
            SINGLE_TRIANGLE
        );
        let mesh = parse_2dm_content(&content).unwrap();

        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn test_parse_quad_splits_in_two() {
        let content = "ND 10 0 0 1\nND 20 2 0 2\nND 30 2 2 3\nND 40 0 2 4\nE4Q 1 10 20 30 40 1\n";
        let mesh = parse_2dm_content(content).unwrap();

        assert_eq!(mesh.triangles().len(), 2);
        assert_eq!(mesh.triangles()[0].vertices, [0, 1, 2]);
        assert_eq!(mesh.triangles()[1].vertices, [0, 2, 3]);
    }

    #[test]
    fn test_parse_forward_node_reference() {
        let content = "E3T 1 7 8 9\nND 7 0 0 0\nND 8 1 0 0\nND 9 0 1 0\n";
        let mesh = parse_2dm_content(content).unwrap();

        assert_eq!(mesh.triangles()[0].vertices, [0, 1, 2]);
    }

    #[test]
    fn test_parse_unknown_node() {
        let content = "ND 1 0 0 0\nND 2 1 0 0\nE3T 1 1 2 5\n";
        let result = parse_2dm_content(content);

        assert!(matches!(
            result,
            Err(LoadError::UnknownNode { line: 3, id: 5 })
        ));
    }

    #[test]
    fn test_parse_duplicate_node() {
        let content = "ND 1 0 0 0\nND 1 1 0 0\n";
        let result = parse_2dm_content(content);

        assert!(matches!(
            result,
            Err(LoadError::DuplicateNode { line: 2, id: 1 })
        ));
    }

    #[test]
    fn test_parse_bad_coordinate() {
        let content = "ND 1 0 abc 0\n";
        let result = parse_2dm_content(content);

        assert!(matches!(result, Err(LoadError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_parse_rejects_non_finite_coordinates() {
        for bad in ["ND 2 inf 0 0", "ND 2 0 NaN 0", "ND 2 0 0 -infinity"] {
            let content = format!("ND 1 0 0 0\n{}\nND 3 0 1 0\nE3T 1 1 2 3\n", bad);
            let result = parse_2dm_content(&content);

            assert!(
                matches!(result, Err(LoadError::ParseError { line: 2, .. })),
                "accepted '{}'",
                bad
            );
        }
    }

    #[test]
    fn test_parse_missing_field() {
        let content = "ND 1 0 0\n";
        let result = parse_2dm_content(content);

        assert!(matches!(result, Err(LoadError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_parse_empty_file() {
        let result = parse_2dm_content("MESH2D\n");

        assert!(matches!(result, Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SINGLE_TRIANGLE.as_bytes()).unwrap();

        let mesh = load_2dm(file.path()).unwrap();
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_2dm(dir.path().join("missing.2dm"));

        assert!(matches!(result, Err(LoadError::FileNotFound(_))));
    }
}
