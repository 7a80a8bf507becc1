//! Package.
//!
//! This module contains the code to download and unpack a java package.

use crate::platform::ArchiveFormat;
use crate::report::Outcome;
use anyhow::anyhow;
use reqwest::Url;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument, trace, warn};

/// Downloads packages over HTTP(S).
#[derive(Debug)]
pub(crate) struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    /// Creates a new `Fetcher` with a default client.
    pub(crate) fn new() -> Self {
        Self::with_client(reqwest::blocking::Client::new())
    }

    /// Creates a new `Fetcher` on top of the given client.
    pub(crate) fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Downloads the given URL to the given file unless the file already exists.
    #[instrument(level = "trace", skip_all, fields(url = %url, dest = %dest.display()))]
    pub(crate) fn fetch(&self, url: &Url, dest: &Path) -> anyhow::Result<Outcome> {
        // check if already downloaded
        if dest.exists() {
            debug!("already downloaded");
            return Ok(Outcome::Skipped);
        }

        // make request
        let mut response = self
            .client
            .get(url.clone()) //
            .header(reqwest::header::ACCEPT, "application/octet-stream") //
            .send()?
            .error_for_status()?;

        // download file (renamed once complete)
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut part = dest.as_os_str().to_owned();
        part.push(".part");
        let part = Path::new(&part);
        trace!(part = %part.display());
        let mut part_file = BufWriter::new(File::create(part)?);
        let bytes_written = response.copy_to(&mut part_file)?;
        part_file.flush()?;
        drop(part_file);
        trace!(bytes_written);
        fs::rename(part, dest)?;

        Ok(Outcome::Done)
    }
}

/// Unpacks the given archive into the given directory unless the directory already exists.
#[instrument(level = "trace", skip_all, fields(?format, archive = %archive.display(), dest = %dest.display()))]
pub(crate) fn unpack(format: ArchiveFormat, archive: &Path, dest: &Path) -> anyhow::Result<Outcome> {
    if dest.exists() {
        debug!("already unpacked");
        return Ok(Outcome::Skipped);
    }

    match format {
        ArchiveFormat::TarGz => unpack_tar_gz(archive, dest)?,
        ArchiveFormat::Zip => unpack_zip(archive, dest)?,
    }

    Ok(Outcome::Done)
}

// Unpacks a gzip-compressed tar archive.
#[doc(hidden)]
fn unpack_tar_gz(pkg: &Path, dest: &Path) -> anyhow::Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let pkg_file = File::open(pkg)?;
    let mut archive = Archive::new(GzDecoder::new(pkg_file));
    archive.set_preserve_permissions(true);
    let mut dest_created = false;
    for entry in archive.entries()? {
        let mut entry = entry?;

        // created with the first readable entry, a corrupt stream leaves no `dest` behind
        if !dest_created {
            fs::create_dir_all(dest)?;
            dest_created = true;
        }

        // skip entry with dangerous name
        let Ok(name) = entry.path() else {
            let path_bytes = &entry.path_bytes();
            let name = String::from_utf8_lossy(path_bytes);
            warn!(name = %name, "skipping dangerous name");
            continue;
        };
        let name = name.into_owned();
        trace!("unpacking {name:?}");

        // `unpack_in` refuses to write outside of `dest`
        if !entry.unpack_in(dest)? {
            warn!(name = %name.display(), "skipping dangerous name");
        }
    }

    Ok(())
}

// Unpacks a zip archive.
#[doc(hidden)]
fn unpack_zip(pkg: &Path, dest: &Path) -> anyhow::Result<()> {
    let pkg_file = File::open(pkg)?;
    let mut zip = zip::ZipArchive::new(pkg_file)?;
    if zip.len() == 0 {
        return Err(anyhow!("archive is empty"));
    }
    fs::create_dir_all(dest)?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let Some(name) = file.enclosed_name() else {
            warn!(name = file.name(), "skipping dangerous name");
            continue;
        };

        let name = dest.join(name);
        trace!("unpacking {name:?}");

        if file.is_dir() {
            fs::create_dir_all(name)?;
        } else {
            if let Some(p) = name.parent() {
                if !p.exists() {
                    fs::create_dir_all(p)?;
                }
            }
            let mut outfile = File::create(&name)?;
            io::copy(&mut file, &mut outfile)?;

            #[cfg(unix)]
            if let Some(mode) = file.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&name, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
