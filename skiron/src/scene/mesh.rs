/// A mesh is a contiguous run of entries in the scene's shared index buffer,
/// three entries per triangle.
#[derive(Clone, Copy, Debug)]
pub struct Mesh {
    begin: u32,
    end: u32,
}

impl Mesh {
    pub fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    pub fn begin(&self) -> u32 {
        self.begin
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn triangle_count(&self) -> usize {
        ((self.end - self.begin) / 3) as usize
    }
}
