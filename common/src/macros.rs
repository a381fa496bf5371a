/// Build a `PathBuf` out of a list of components.
///
/// ```
/// use std::path::PathBuf;
/// use geofence_common::makepath;
///
/// let p: PathBuf = makepath!("/home", "foo", ".config");
/// assert_eq!(PathBuf::from("/home/foo/.config"), p);
/// ```
///
#[macro_export]
macro_rules! makepath {
    ($($item:expr),+) => {
        [
        $(std::path::PathBuf::from($item),)+
        ]
        .iter()
        .collect::<std::path::PathBuf>()
    };
}
