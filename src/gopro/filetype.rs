/// High (`MP4`), low (`LRV`),
/// or either resolution (`ANY`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GoProFileType {
    /// High-resolution GoPro clip (`.MP4`)
    High,
    /// Low-resolution GoPro clip (`.LRV`)
    Low,
    /// Either LRV or MP4 GoPro clip
    #[default]
    Any
}

impl GoProFileType {
    /// Lower case file extensions matching this type.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::High => &["mp4"],
            Self::Low => &["lrv"],
            Self::Any => &["mp4", "lrv"],
        }
    }
}
