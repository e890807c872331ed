use crate::AssetError;
use image::GenericImageView;
use std::path::{Path, PathBuf};
use torusfield_common::{ColorSpace, CubeFaces};

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Solid single-pixel image.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }
}

/// Six square faces of equal size, in `px nx py ny pz nz` order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeImage {
    pub size: u32,
    pub faces: [ImageData; 6],
}

/// Anything the renderer can upload.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedTexture {
    Flat {
        image: ImageData,
        color_space: ColorSpace,
    },
    Cube(CubeImage),
}

impl LoadedTexture {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flat { .. } => "texture",
            Self::Cube(_) => "cube map",
        }
    }
}

/// Read and decode one image file into RGBA8.
pub fn decode_file(path: &Path) -> Result<ImageData, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = img.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: img.to_rgba8().into_raw(),
    })
}

/// Decode six cube faces. All faces must be square and the same size.
pub fn decode_cube(faces: &CubeFaces) -> Result<CubeImage, AssetError> {
    let [px, nx, py, ny, pz, nz] = &faces.0;
    let first = decode_file(px)?;
    let size = first.width;
    let face = |path: &PathBuf, image: ImageData| {
        if image.size() == (size, size) {
            Ok(image)
        } else {
            Err(AssetError::CubeFaceMismatch {
                path: path.clone(),
                expected: (size, size),
                got: image.size(),
            })
        }
    };
    Ok(CubeImage {
        size,
        faces: [
            face(px, first)?,
            face(nx, decode_file(nx)?)?,
            face(py, decode_file(py)?)?,
            face(ny, decode_file(ny)?)?,
            face(pz, decode_file(pz)?)?,
            face(nz, decode_file(nz)?)?,
        ],
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn write_png(dir: &Path, name: &str, w: u32, h: u32, rgba: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
            .save(&path)
            .unwrap();
        path
    }

    pub(crate) fn write_cube(dir: &Path, size: u32) -> CubeFaces {
        for name in ["px", "nx", "py", "ny", "pz", "nz"] {
            write_png(dir, &format!("{name}.png"), size, size, [10, 20, 30, 255]);
        }
        CubeFaces::from_dir(dir, "png")
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 2, [128, 128, 255, 255]);
        let img = decode_file(&path).unwrap();
        assert_eq!(img.size(), (3, 2));
        assert_eq!(img.rgba.len(), 3 * 2 * 4);
        assert_eq!(&img.rgba[..4], &[128, 128, 255, 255]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_file(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(decode_file(&path), Err(AssetError::Decode { .. })));
    }

    #[test]
    fn cube_faces_decode_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let faces = write_cube(dir.path(), 4);
        let cube = decode_cube(&faces).unwrap();
        assert_eq!(cube.size, 4);
        assert!(cube.faces.iter().all(|f| f.size() == (4, 4)));
    }

    #[test]
    fn cube_face_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let faces = write_cube(dir.path(), 4);
        write_png(dir.path(), "pz.png", 8, 8, [0, 0, 0, 255]);
        let err = decode_cube(&faces).unwrap_err();
        assert!(matches!(
            err,
            AssetError::CubeFaceMismatch {
                expected: (4, 4),
                got: (8, 8),
                ..
            }
        ));
    }

    #[test]
    fn non_square_first_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let faces = write_cube(dir.path(), 4);
        write_png(dir.path(), "px.png", 4, 2, [0, 0, 0, 255]);
        assert!(matches!(
            decode_cube(&faces),
            Err(AssetError::CubeFaceMismatch { .. })
        ));
    }
}
