/// The `CFF ` (Compact Font Format) table
#[allow(non_snake_case)]
pub mod CFF;
/// The `COLR` (Color) table
#[allow(non_snake_case)]
pub mod COLR;
/// The `GDEF` (Glyph definition) table
#[allow(non_snake_case)]
pub mod GDEF;
/// The `GPOS` (Glyph positioning) table
#[allow(non_snake_case)]
pub mod GPOS;
/// The `GSUB` (Glyph substitution) table
#[allow(non_snake_case)]
pub mod GSUB;
/// The `VORG` (Vertical origin) table
#[allow(non_snake_case)]
pub mod VORG;
/// The `cmap` (Character To Glyph Index Mapping) table
pub mod cmap;
/// The `glyf` (Glyf data) table
pub mod glyf;
/// The `hdmx` (Horizontal device metrics) table
pub mod hdmx;
/// The `head` (Header) table
pub mod head;
/// The `hmtx` and `vmtx` (Horizontal and vertical metrics) tables
pub mod hmtx;
/// The `kern` (Kerning) table
pub mod kern;
/// The `maxp` (Maximum profile) table
pub mod maxp;
/// The `name` (Naming) table
pub mod name;
/// The `post` (PostScript) table
pub mod post;
