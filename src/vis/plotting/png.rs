pub mod band;
pub mod landscape;

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngBundle {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
