//! Python bindings for IPED.
//!
//! This module exposes design generation to Python using PyO3. Enable the
//! `python` feature to use this.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::builder::Design;
use crate::DesignBuilder;

fn to_py_err(err: crate::Error) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}

/// Python wrapper for a generated design.
#[pyclass(name = "Design")]
pub struct PyDesign {
    inner: Design,
}

#[pymethods]
impl PyDesign {
    /// Number of stimulus elements.
    #[getter]
    fn num_elements(&self) -> usize {
        self.inner.matrix().num_elements()
    }

    /// Number of respondents.
    #[getter]
    fn num_respondents(&self) -> usize {
        self.inner.matrix().num_respondents()
    }

    /// Total number of tasks.
    #[getter]
    fn num_tasks(&self) -> usize {
        self.inner.matrix().num_tasks()
    }

    /// One dict per task, in respondent-major order.
    fn tasks(&self, py: Python<'_>) -> PyResult<PyObject> {
        task_dicts(py, &self.inner)
    }

    /// Element appearance counts.
    fn element_counts(&self) -> Vec<usize> {
        self.inner.report().element_counts.clone()
    }

    /// Pair co-occurrence counts as `(i, j, count)` tuples.
    fn pair_counts(&self) -> Vec<(usize, usize, usize)> {
        self.inner
            .report()
            .pair_counts
            .iter()
            .map(|p| (p.first, p.second, p.count))
            .collect()
    }

    /// The text balance report.
    fn report(&self) -> String {
        self.inner.report().to_string()
    }

    /// The design as CSV.
    fn to_csv(&self) -> String {
        self.inner.matrix().to_string()
    }
}

fn task_dicts(py: Python<'_>, design: &Design) -> PyResult<PyObject> {
    let list = PyList::empty(py);
    for task in design.matrix().tasks() {
        let row = PyDict::new(py);
        row.set_item("respondent_index", task.respondent_index())?;
        row.set_item("task_index", task.task_index())?;
        row.set_item("task_id", task.id().to_string())?;
        row.set_item("active_elements", task.active_element_indices())?;
        list.append(row)?;
    }
    Ok(list.into())
}

fn builder_for(
    num_elements: usize,
    tasks_per_respondent: usize,
    num_respondents: usize,
    min_active: usize,
    max_active: usize,
    seed: Option<u64>,
    oversampling: usize,
    unique_per_respondent: bool,
) -> DesignBuilder {
    let builder = DesignBuilder::new()
        .elements(num_elements)
        .tasks_per_respondent(tasks_per_respondent)
        .respondents(num_respondents)
        .active_range(min_active, max_active)
        .oversampling(oversampling)
        .unique_per_respondent(unique_per_respondent);
    match seed {
        Some(seed) => builder.seed(seed),
        None => builder,
    }
}

/// Generate a design and return one dict per task with keys
/// `respondent_index`, `task_index`, `task_id` and `active_elements`.
#[pyfunction]
#[pyo3(signature = (
    num_elements,
    tasks_per_respondent,
    num_respondents,
    min_active,
    max_active,
    seed=None,
    oversampling=20,
    unique_per_respondent=false
))]
fn generate_design(
    py: Python<'_>,
    num_elements: usize,
    tasks_per_respondent: usize,
    num_respondents: usize,
    min_active: usize,
    max_active: usize,
    seed: Option<u64>,
    oversampling: usize,
    unique_per_respondent: bool,
) -> PyResult<PyObject> {
    let design = builder_for(
        num_elements,
        tasks_per_respondent,
        num_respondents,
        min_active,
        max_active,
        seed,
        oversampling,
        unique_per_respondent,
    )
    .build()
    .map_err(to_py_err)?;
    task_dicts(py, &design)
}

/// Generate a design and keep it with its balance report.
#[pyfunction]
#[pyo3(signature = (
    num_elements,
    tasks_per_respondent,
    num_respondents,
    min_active,
    max_active,
    seed=None,
    oversampling=20,
    unique_per_respondent=false
))]
fn build_design(
    num_elements: usize,
    tasks_per_respondent: usize,
    num_respondents: usize,
    min_active: usize,
    max_active: usize,
    seed: Option<u64>,
    oversampling: usize,
    unique_per_respondent: bool,
) -> PyResult<PyDesign> {
    let design = builder_for(
        num_elements,
        tasks_per_respondent,
        num_respondents,
        min_active,
        max_active,
        seed,
        oversampling,
        unique_per_respondent,
    )
    .build()
    .map_err(to_py_err)?;
    Ok(PyDesign { inner: design })
}

/// Recommend `(tasks_per_respondent, active_count)` for a study.
#[pyfunction]
#[pyo3(signature = (num_elements, num_respondents, max_tasks=24))]
fn recommend_parameters(
    num_elements: usize,
    num_respondents: usize,
    max_tasks: usize,
) -> PyResult<(usize, usize)> {
    let rec = crate::policy::recommend_parameters(num_elements, num_respondents, max_tasks)
        .map_err(to_py_err)?;
    Ok((rec.params.tasks_per_respondent, rec.params.min_active_elements))
}

/// The IPED Python module.
#[pymodule]
fn iped(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyDesign>()?;
    m.add_function(wrap_pyfunction!(generate_design, m)?)?;
    m.add_function(wrap_pyfunction!(build_design, m)?)?;
    m.add_function(wrap_pyfunction!(recommend_parameters, m)?)?;
    Ok(())
}
