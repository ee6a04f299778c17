/// Output layer: highlighted-XLSX rendering and artifact delivery.
///
/// Rendering turns an `AnnotatedDataset` into a single-sheet workbook where
/// flagged cells carry a red fill; delivery hands the rendered artifacts to
/// their destination. A delivery failure never invalidates the comparison
/// the artifacts came from.
pub mod deliver;
pub mod xlsx;
