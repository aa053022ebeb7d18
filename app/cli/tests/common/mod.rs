//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for cube export and query integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use app_lib::{
    run_export, CsvFactSource, CubeConfig, CubeState, ExportError, ExportSummary, PublishError,
    Publisher,
};
use tempfile::TempDir;

/// Test harness owning a scratch directory with a source extract and a
/// snapshot path.
pub struct TestHarness {
    pub dir: TempDir,
    pub config: CubeConfig,
}

impl TestHarness {
    /// Create a harness whose snapshot does not exist yet.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = CubeConfig::default();
        config.snapshot_path = dir.path().join("vw_cubo_proyectos.csv");
        config.source.path = Some(dir.path().join("extract.csv"));
        TestHarness { dir, config }
    }

    /// Create a harness whose snapshot was exported from the project fixture.
    pub fn with_exported_fixture() -> Self {
        let harness = Self::new();
        harness.write_source(&ProjectFixture::csv());
        harness.export().expect("initial export");
        harness
    }

    pub fn source_path(&self) -> PathBuf {
        self.config.source.path.clone().expect("source path configured")
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.config.snapshot_path
    }

    /// Replace the source extract the next export reads.
    pub fn write_source(&self, csv: &str) {
        fs::write(self.source_path(), csv).expect("write source extract");
    }

    pub fn snapshot_text(&self) -> String {
        fs::read_to_string(self.snapshot_path()).expect("read snapshot")
    }

    pub fn source(&self) -> CsvFactSource {
        CsvFactSource::from_config(&self.config.source).expect("source configured")
    }

    pub fn export(&self) -> Result<ExportSummary, ExportError> {
        run_export(&self.config, &self.source(), None)
    }

    pub fn export_with(&self, publisher: &dyn Publisher) -> Result<ExportSummary, ExportError> {
        run_export(&self.config, &self.source(), Some(publisher))
    }

    /// Fresh query-side state over this harness's snapshot.
    pub fn state(&self) -> CubeState {
        CubeState::new(self.snapshot_path(), self.config.locale)
    }
}

/// Project fact rows.
///
/// Budget by industry: Retail 200, Tech 150, Health 40. Project B has no
/// client.
pub struct ProjectFixture;

impl ProjectFixture {
    pub fn headers() -> Vec<&'static str> {
        vec![
            "fact_id",
            "year",
            "quarter",
            "full_date",
            "industry",
            "client_name",
            "project_type",
            "team_name",
            "project_name",
            "status",
            "budget",
            "actual_cost",
            "budget_deviation",
            "estimated_hours_total",
            "actual_hours_total",
            "defects_reported",
            "defect_cost",
        ]
    }

    /// Spanish warehouse names for the same columns, in the same order.
    pub fn spanish_headers() -> Vec<&'static str> {
        vec![
            "id_hecho",
            "anio",
            "trimestre",
            "fecha_completa",
            "industria",
            "nombre_cliente",
            "tipo_proyecto",
            "nombre_equipo",
            "nombre_proyecto",
            "estado",
            "presupuesto",
            "costo_real",
            "desviacion_presupuestal",
            "horas_estimadas_total",
            "horas_reales_total",
            "defectos_reportados",
            "costo_defecto",
        ]
    }

    pub fn rows() -> Vec<&'static str> {
        vec![
            "1,2023,1,2023-01-15,Tech,Acme,Web,Red,A,1,100,90,-10,50,45,2,20",
            "2,2023,2,2023-04-10,Tech,,Mobile,Blue,B,0,50,60,10,30,35,1,5",
            "3,2023,3,2023-07-01,Retail,Shopco,Web,Red,C,1,80,70,-10,40,38,0,0",
            "4,2024,1,2024-02-20,Retail,Shopco,Data,Blue,D,0,120,130,10,60,70,3,45",
            "5,2024,2,2024-05-05,Health,Medi,Data,Green,E,1,40,40,0,20,20,0,0",
        ]
    }

    pub fn csv() -> String {
        Self::csv_with(&Self::headers(), &Self::rows())
    }

    pub fn csv_with(headers: &[&str], rows: &[&str]) -> String {
        let mut out = headers.join(",");
        out.push('\n');
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }
}

/// Publisher that records every snapshot it was asked to publish.
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: RefCell<Vec<PathBuf>>,
}

impl Publisher for RecordingPublisher {
    fn publish(&self, snapshot: &Path) -> Result<(), PublishError> {
        self.published.borrow_mut().push(snapshot.to_path_buf());
        Ok(())
    }
}

/// Publisher that always fails like a rejected push.
pub struct FailingPublisher;

impl Publisher for FailingPublisher {
    fn publish(&self, _snapshot: &Path) -> Result<(), PublishError> {
        Err(PublishError::Failed {
            command: "git push origin".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "rejected".to_string(),
        })
    }
}
