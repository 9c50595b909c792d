/// Opaque handle to a marker owned by the map layer.
///
/// Items keep one of these as a non-owning back reference; the marker's
/// lifetime belongs to whoever issued the handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(u32);

impl MarkerHandle {
    pub fn new(index: u32) -> Self {
        MarkerHandle(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}
