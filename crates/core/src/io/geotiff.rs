//! Native GeoTIFF reading/writing of analysed grids
//!
//! Uses the `tiff` crate. Grids are written north-up as 32-bit float with
//! ModelPixelScale, ModelTiepoint and a minimal GeoKeyDirectory declaring a
//! geographic (lon/lat) model. Pixel centres sit on grid nodes.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use crate::error::{Error, Result};
use crate::grid::{GeoTransform, Grid};

/// Write a grid to a GeoTIFF file
pub fn write_geotiff<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_geotiff(grid, file)
}

/// Write a grid to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(grid: &Grid) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(grid, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Read a grid previously written by [`write_geotiff`]
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a grid from an in-memory GeoTIFF buffer
pub fn read_geotiff_from_buffer(data: &[u8]) -> Result<Grid> {
    decode_geotiff(Cursor::new(data))
}

fn tiff_err(context: &str) -> impl Fn(tiff::TiffError) -> Error + '_ {
    move |e| Error::Tiff(format!("{}: {}", context, e))
}

fn encode_geotiff<W>(grid: &Grid, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err("cannot create encoder"))?;

    let (nx, ny) = grid.shape();
    let values = grid.values();

    // Raster row 0 is the northernmost latitude
    let mut data = Vec::with_capacity(nx * ny);
    for row in 0..ny {
        let j = ny - 1 - row;
        for i in 0..nx {
            data.push(values[[i, j]] as f32);
        }
    }

    let mut image = encoder
        .new_image::<Gray32Float>(nx as u32, ny as u32)
        .map_err(tiff_err("cannot create image"))?;

    let gt = grid.geotransform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(tiff_err("cannot write pixel scale"))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(tiff_err("cannot write tiepoint"))?;

    // GTModelTypeGeoKey = Geographic, GTRasterTypeGeoKey = PixelIsArea,
    // GeographicTypeGeoKey = WGS 84
    let geokeys: [u16; 16] = [
        1, 1, 0, 3, //
        1024, 0, 1, 2, //
        1025, 0, 1, 1, //
        2048, 0, 1, 4326,
    ];
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
        .map_err(tiff_err("cannot write geokeys"))?;

    image
        .write_data(&data)
        .map_err(tiff_err("cannot write image data"))?;

    Ok(())
}

fn decode_geotiff<R>(reader: R) -> Result<Grid>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader).map_err(tiff_err("cannot decode"))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(tiff_err("cannot read dimensions"))?;
    let cols = width as usize;
    let rows = height as usize;

    let pixels: Vec<f64> = match decoder
        .read_image()
        .map_err(tiff_err("cannot read image data"))?
    {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        _ => return Err(Error::Tiff("unsupported pixel format".into())),
    };

    if pixels.len() != rows * cols {
        return Err(Error::SizeMismatch {
            name: "pixels",
            expected: rows * cols,
            actual: pixels.len(),
        });
    }

    let transform = read_geotransform(&mut decoder)?;
    let axes = transform.to_axes(cols, rows)?;

    let mut values = Array2::zeros((cols, rows));
    for row in 0..rows {
        let j = rows - 1 - row;
        for i in 0..cols {
            values[[i, j]] = pixels[row * cols + i];
        }
    }

    Grid::new(values, axes)
}

fn read_geotransform<R>(decoder: &mut Decoder<R>) -> Result<GeoTransform>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(tiff_err("no pixel scale tag"))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(tiff_err("no tiepoint tag"))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Tiff("cannot determine geotransform".into()));
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridAxes, GridAxis};

    fn sample_grid() -> Grid {
        let axes = GridAxes::new(
            GridAxis::new(140.0, 0.5, 5).unwrap(),
            GridAxis::new(-60.0, 0.25, 3).unwrap(),
        );
        let data: Vec<f64> = (0..15).map(|v| v as f64 * 0.5).collect();
        Grid::from_vec(data, axes).unwrap()
    }

    #[test]
    fn test_buffer_roundtrip_preserves_orientation() {
        let grid = sample_grid();
        let buf = write_geotiff_to_buffer(&grid).unwrap();
        let back = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (5, 3));
        for i in 0..5 {
            for j in 0..3 {
                let expected = grid.get(i, j).unwrap();
                let actual = back.get(i, j).unwrap();
                assert!(
                    (expected - actual).abs() < 1e-6,
                    "cell ({}, {}) expected {}, got {}",
                    i, j, expected, actual
                );
            }
        }
        assert!((back.axes().x.origin() - 140.0).abs() < 1e-9);
        assert!((back.axes().y.origin() + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_geo_tags_readable_by_name() {
        let buf = write_geotiff_to_buffer(&sample_grid()).unwrap();
        let mut decoder = Decoder::new(Cursor::new(&buf[..])).unwrap();

        let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).unwrap();
        assert_eq!(scale, vec![0.5, 0.25, 0.0]);

        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap();
        assert_eq!(tiepoint.len(), 6);
        assert!((tiepoint[3] - 139.75).abs() < 1e-12, "origin x {}", tiepoint[3]);
        assert!((tiepoint[4] + 59.375).abs() < 1e-12, "origin y {}", tiepoint[4]);

        let geokeys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).unwrap();
        assert_eq!(geokeys.len(), 16);
        assert_eq!(geokeys[15], 4326);
    }

    #[test]
    fn test_file_roundtrip() {
        let grid = sample_grid();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.tif");
        write_geotiff(&grid, &path).unwrap();
        let back = read_geotiff(&path).unwrap();
        assert_eq!(back.shape(), grid.shape());
        assert_eq!(back.get(4, 2).unwrap(), grid.get(4, 2).unwrap());
        assert!((back.axes().y.last() - grid.axes().y.last()).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_buffer_rejected() {
        let result = read_geotiff_from_buffer(b"not a tiff");
        assert!(matches!(result, Err(Error::Tiff(_))));
    }
}
