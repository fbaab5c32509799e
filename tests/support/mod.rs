//! OSRM test infrastructure: dataset download, preprocessing and a reusable
//! `osrm-routed` container.
//!
//! The first run downloads the Geofabrik extract and runs the MLD pipeline in
//! docker; later runs reuse both the prepared files and the container.

#![allow(dead_code)]

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

const OSRM_IMAGE: &str = "osrm/osrm-backend";

/// Geofabrik region path, e.g. "north-america/us/nevada".
#[derive(Debug, Clone)]
pub struct Region(pub &'static str);

impl Region {
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("region")
    }

    fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.0)
    }
}

#[derive(Debug)]
pub enum PrepError {
    Io(io::Error),
    Http(reqwest::Error),
    Docker(String),
}

impl From<io::Error> for PrepError {
    fn from(err: io::Error) -> Self {
        PrepError::Io(err)
    }
}

impl From<reqwest::Error> for PrepError {
    fn from(err: reqwest::Error) -> Self {
        PrepError::Http(err)
    }
}

/// Prepared MLD dataset on disk.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

impl Dataset {
    /// Downloads and preprocesses `region` under `$OSRM_DATA_DIR` (default
    /// `osrm-data`) unless a complete dataset is already there.
    pub fn ensure(region: &Region) -> Result<Self, PrepError> {
        let root = PathBuf::from(env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string()));
        let root = if root.is_absolute() { root } else { env::current_dir()?.join(root) };
        let data_dir = root.join(region.name());
        fs::create_dir_all(&data_dir)?;

        let pbf = data_dir.join(format!("{}-latest.osm.pbf", region.name()));
        if !pbf.exists() {
            download(&region.url(), &pbf)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", region.name()));
        if !osrm_base.exists() {
            docker(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &in_container(&pbf)])?;
        }
        if !mld_ready(&osrm_base) {
            docker(&data_dir, &["osrm-partition", &in_container(&osrm_base)])?;
            docker(&data_dir, &["osrm-customize", &in_container(&osrm_base)])?;
        }

        Ok(Self { data_dir, osrm_base })
    }

    /// Changes whenever the dataset is rebuilt, so stale containers are not reused.
    fn version(&self) -> u64 {
        fs::metadata(self.osrm_base.with_extension("osrm.partition"))
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|age| age.as_secs())
            .unwrap_or(0)
    }
}

/// Starts (or reuses) `osrm-routed` for `region` and returns it with its base URL.
pub fn osrm_container(region: &Region) -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let dataset = Dataset::ensure(region)
        .map_err(|err| TestcontainersError::other(format!("OSRM prep failed: {:?}", err)))?;

    let image = GenericImage::new(OSRM_IMAGE, "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(dataset.data_dir.to_string_lossy().to_string(), "/data"))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            in_container(&dataset.osrm_base),
        ])
        .with_container_name(format!("osrm-{}-mld-{}", region.name(), dataset.version()))
        .with_startup_timeout(Duration::from_secs(30))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    Ok((container, format!("http://127.0.0.1:{}", port)))
}

/// Blocks until `probe` succeeds or `timeout` runs out.
pub fn wait_until(timeout: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let started = SystemTime::now();
    while started.elapsed().is_ok_and(|elapsed| elapsed < timeout) {
        if probe() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    false
}

fn download(url: &str, dest: &Path) -> Result<(), PrepError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let partial = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&partial)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(partial, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    osrm_base.exists()
        && ["osrm.partition", "osrm.mldgr", "osrm.cells"]
            .iter()
            .all(|extension| osrm_base.with_extension(extension).exists())
}

fn docker(data_dir: &Path, args: &[&str]) -> Result<(), PrepError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(PrepError::Docker(format!("docker exited with status {}", status)))
    }
}

fn in_container(path: &Path) -> String {
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    format!("/data/{}", name)
}
