//! The world (sector) mesh and its text loader.
//!
//! A world file is line oriented:
//!
//! ```text
//! // comments and blank lines may appear anywhere
//! NUMPOLLIES 2
//!
//! // floor
//! -3.0 0.0 -3.0 0.0 6.0
//! -3.0 0.0  3.0 0.0 0.0
//!  3.0 0.0  3.0 6.0 0.0
//!
//! -3.0 0.0 -3.0 0.0 6.0
//!  3.0 0.0 -3.0 6.0 6.0
//!  3.0 0.0  3.0 6.0 0.0
//! ```
//!
//! The header declares the triangle count; exactly three `x y z u v` records
//! follow per triangle. Anything after the last declared record is ignored.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | uv        | Float32x2 | 12     | 1               |

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// A textured vertex as stored in the world file and uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// Three vertices wound counter-clockwise when seen from the front.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

/// The static walkable scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct World {
    triangles: Vec<Triangle>,
}

const HEADER: &str = "NUMPOLLIES";
const PREALLOCATED_TRIANGLES: usize = 4096;

impl World {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Parses a world description held in memory.
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_reader(source.as_bytes())
    }

    /// Loads a world file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let world = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "loaded {} triangles from {}",
            world.triangle_count(),
            path.display()
        );
        Ok(world)
    }

    /// Parses a world description from any buffered reader.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut records = Records::new(reader);

        let (line_no, header) = records
            .next_record()?
            .ok_or_else(|| Error::malformed(records.line_no, "missing NUMPOLLIES header"))?;
        let count = parse_header(&header).ok_or_else(|| {
            Error::malformed(line_no, format!("expected `{HEADER} <count>`, found {header:?}"))
        })?;

        // The header is untrusted; grow past this as records actually arrive.
        let mut triangles = Vec::with_capacity(count.min(PREALLOCATED_TRIANGLES));
        for index in 0..count {
            let mut vertices = [Vertex::new([0.0; 3], [0.0; 2]); 3];
            for (corner, vertex) in vertices.iter_mut().enumerate() {
                let (line_no, record) = records.next_record()?.ok_or_else(|| {
                    Error::malformed(
                        records.line_no,
                        format!(
                            "unexpected end of file: {HEADER} declares {count} triangles, \
                             input stops at vertex {} of triangle {}",
                            corner + 1,
                            index + 1
                        ),
                    )
                })?;
                *vertex = parse_vertex(&record).ok_or_else(|| {
                    Error::malformed(line_no, format!("expected `x y z u v`, found {record:?}"))
                })?;
            }
            triangles.push(Triangle { vertices });
        }

        Ok(Self { triangles })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Every triangle's corners in order, ready for a non-indexed draw.
    pub fn vertices(&self) -> &[Vertex] {
        bytemuck::cast_slice(&self.triangles)
    }
}

/// Shorthand for [`World::parse`].
pub fn load_world(source: &str) -> Result<World> {
    World::parse(source)
}

/// Yields data lines, skipping blank lines and `/` comments.
struct Records<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> Records<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    fn next_record(&mut self) -> Result<Option<(usize, String)>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|e| Error::malformed(self.line_no + 1, e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('/') {
                continue;
            }
            return Ok(Some((self.line_no, line.to_string())));
        }
    }
}

fn parse_header(line: &str) -> Option<usize> {
    let mut fields = line.split_whitespace();
    if fields.next()? != HEADER {
        return None;
    }
    let count = fields.next()?.parse().ok()?;
    fields.next().is_none().then_some(count)
}

fn parse_vertex(line: &str) -> Option<Vertex> {
    let mut values = [0.0f32; 5];
    let mut fields = line.split_whitespace();
    for value in &mut values {
        *value = fields.next()?.parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    let [x, y, z, u, v] = values;
    Some(Vertex::new([x, y, z], [u, v]))
}
