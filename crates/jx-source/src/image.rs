use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use exif::{Exif, In, Tag, Value};
use jx_core::{Exposure, Record, ValueParser};
use rayon::prelude::*;

/// Reads the capture metadata of one image.
///
/// Never fails: an image without readable EXIF data yields a record that
/// carries only its path and name.
pub fn read_image(path: &Path) -> Record {
    let mut record = Record {
        path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };

    match read_exif(path) {
        Ok(exif) => {
            record.datetime = ascii(&exif, Tag::DateTimeOriginal)
                .or_else(|| ascii(&exif, Tag::DateTime))
                .and_then(|value| match ValueParser::new().datetime(&value) {
                    Ok(datetime) => Some(datetime),
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "ignoring capture time");
                        None
                    }
                });
            record.exposure_time = exposure(&exif);
            record.model = ascii(&exif, Tag::Model);
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable exif data");
        }
    }

    record.normalized()
}

/// Reads many images in parallel, keeping their order.
pub fn read_images(paths: &[PathBuf]) -> Vec<Record> {
    paths.par_iter().map(|path| read_image(path)).collect()
}

fn read_exif(path: &Path) -> Result<Exif, exif::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader)
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref parts) = field.value else {
        return None;
    };
    let text = String::from_utf8_lossy(parts.first()?);
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| text.to_string())
}

fn exposure(exif: &Exif) -> Option<Exposure> {
    let field = exif.get_field(Tag::ExposureTime, In::PRIMARY)?;
    let Value::Rational(ref values) = field.value else {
        return None;
    };
    let value = values.first()?;
    Exposure::new(value.num, value.denom).ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    /// Builds a big-endian TIFF block with Model in IFD0 and ExposureTime
    /// plus DateTimeOriginal in the Exif IFD.
    fn tiff(model: &str, exposure: (u32, u32), datetime: &str) -> Vec<u8> {
        let mut model = model.as_bytes().to_vec();
        model.push(0);
        let mut datetime = datetime.as_bytes().to_vec();
        datetime.push(0);

        let ifd0 = 8_u32;
        let model_at = ifd0 + 2 + 2 * 12 + 4;
        let exif_ifd = (model_at + u32::try_from(model.len()).unwrap() + 1) & !1;
        let exposure_at = exif_ifd + 2 + 2 * 12 + 4;
        let datetime_at = exposure_at + 8;

        let mut out = Vec::new();
        out.extend_from_slice(b"MM\0\x2a");
        out.extend_from_slice(&ifd0.to_be_bytes());

        let entry = |out: &mut Vec<u8>, tag: u16, kind: u16, count: usize, value: u32| {
            out.extend_from_slice(&tag.to_be_bytes());
            out.extend_from_slice(&kind.to_be_bytes());
            out.extend_from_slice(&u32::try_from(count).unwrap().to_be_bytes());
            out.extend_from_slice(&value.to_be_bytes());
        };

        out.extend_from_slice(&2_u16.to_be_bytes());
        entry(&mut out, 0x0110, 2, model.len(), model_at);
        entry(&mut out, 0x8769, 4, 1, exif_ifd);
        out.extend_from_slice(&0_u32.to_be_bytes());
        out.extend_from_slice(&model);
        out.resize(exif_ifd as usize, 0);

        out.extend_from_slice(&2_u16.to_be_bytes());
        entry(&mut out, 0x829a, 5, 1, exposure_at);
        entry(&mut out, 0x9003, 2, datetime.len(), datetime_at);
        out.extend_from_slice(&0_u32.to_be_bytes());
        out.extend_from_slice(&exposure.0.to_be_bytes());
        out.extend_from_slice(&exposure.1.to_be_bytes());
        out.extend_from_slice(&datetime);
        out
    }

    /// Wraps a TIFF block into a minimal JPEG with an APP1 segment.
    fn jpeg(tiff: &[u8]) -> Vec<u8> {
        let mut out = vec![0xff, 0xd8, 0xff, 0xe1];
        let len = u16::try_from(2 + 6 + tiff.len()).unwrap();
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(tiff);
        out.extend_from_slice(&[0xff, 0xd9]);
        out
    }

    #[test]
    fn reads_exif_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.JPG");
        std::fs::write(
            &path,
            jpeg(&tiff("X100", (1, 250), "2013:07:09 20:05:13")),
        )
        .unwrap();

        let record = read_image(&path);

        assert_eq!(record.name.as_deref(), Some("IMG_0001.JPG"));
        assert_eq!(record.model.as_deref(), Some("X100"));
        assert_eq!(record.exposure_time, Some(Exposure::new(1, 250).unwrap()));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2013, 7, 9));
        assert_eq!(
            record.time.map(|t| t.to_string()),
            Some("20:05:13".to_string())
        );
    }

    #[test]
    fn file_without_exif_keeps_path_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.JPG");
        std::fs::write(&path, b"not an image").unwrap();

        let record = read_image(&path);

        assert_eq!(record.path, Some(path.to_string_lossy().into_owned()));
        assert_eq!(record.name.as_deref(), Some("broken.JPG"));
        assert_eq!(record.date, None);
        assert_eq!(record.model, None);
    }

    #[test]
    fn read_images_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("IMG_{i}.JPG"));
                std::fs::write(&path, b"").unwrap();
                path
            })
            .collect();

        let names: Vec<_> = read_images(&paths)
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        let expected: Vec<_> = (0..8).map(|i| format!("IMG_{i}.JPG")).collect();
        assert_eq!(names, expected);
    }
}
