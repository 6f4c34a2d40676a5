//! The exercise corpus: the ordered module list, each module's lessons and
//! its boss fight. A copy ships inside the binary; a directory with the same
//! layout can replace it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exercise::{BossExercise, Exercise, ExerciseKind, ModuleInfo};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog/data");

pub const MODULES_FILE: &str = "modules.json";

#[derive(Debug, Deserialize)]
struct ModuleFile {
    #[serde(default)]
    lessons: Vec<Exercise>,
    boss: Option<BossExercise>,
}

enum Source<'a> {
    Embedded,
    Dir(&'a Path),
}

impl Source<'_> {
    fn path(&self, name: &str) -> PathBuf {
        match self {
            Source::Embedded => PathBuf::from(name),
            Source::Dir(dir) => dir.join(name),
        }
    }

    fn read(&self, name: &str) -> Result<String> {
        match self {
            Source::Embedded => DATA_DIR
                .get_file(name)
                .and_then(|file| file.contents_utf8())
                .map(str::to_string)
                .ok_or_else(|| Error::catalog(name, "missing from the built-in corpus")),
            Source::Dir(dir) => {
                let path = dir.join(name);
                fs::read_to_string(&path).map_err(|e| Error::catalog(path, e.to_string()))
            }
        }
    }

    fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.read(name)?;
        serde_json::from_str(&text).map_err(|e| Error::catalog(self.path(name), e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    modules: Vec<ModuleInfo>,
    order: Vec<String>,
    lessons: HashMap<String, Vec<Exercise>>,
    bosses: HashMap<String, BossExercise>,
}

impl Catalog {
    /// The corpus compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::load(&Source::Embedded)
    }

    /// A corpus laid out as `modules.json` plus one `<module>.json` per
    /// listed module.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load(&Source::Dir(dir.as_ref()))
    }

    /// `from_dir` when a directory is configured, the built-in corpus otherwise.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    fn load(source: &Source<'_>) -> Result<Self> {
        let modules: Vec<ModuleInfo> = source.parse(MODULES_FILE)?;
        if modules.is_empty() {
            return Err(Error::catalog(source.path(MODULES_FILE), "no modules listed"));
        }

        let mut order = Vec::with_capacity(modules.len());
        let mut lessons = HashMap::new();
        let mut bosses = HashMap::new();
        let mut seen = HashSet::new();

        for info in &modules {
            if order.contains(&info.id) {
                return Err(Error::catalog(
                    source.path(MODULES_FILE),
                    format!("module `{}` listed twice", info.id),
                ));
            }
            order.push(info.id.clone());

            let name = format!("{}.json", info.id);
            let file: ModuleFile = source.parse(&name)?;
            let check = |ex: &Exercise, seen: &mut HashSet<String>| -> Result<()> {
                check_exercise(ex, seen)
                    .map_err(|reason| Error::catalog(source.path(&name), reason))
            };

            let module_lessons: Vec<Exercise> = file
                .lessons
                .into_iter()
                .map(|ex| stamp(ex, info, ExerciseKind::Lesson))
                .collect();
            for ex in &module_lessons {
                check(ex, &mut seen)?;
            }

            if let Some(mut boss) = file.boss {
                boss.module = info.id.clone();
                for step in &mut boss.steps {
                    step.exercise = stamp(step.exercise.clone(), info, ExerciseKind::Boss);
                    check(&step.exercise, &mut seen)?;
                }
                if boss.steps.is_empty() || boss.lives == 0 {
                    return Err(Error::catalog(
                        source.path(&name),
                        format!("boss `{}` needs at least one step and one life", boss.id),
                    ));
                }
                bosses.insert(info.id.clone(), boss);
            }

            debug!(module = %info.id, lessons = module_lessons.len(), "loaded module");
            lessons.insert(info.id.clone(), module_lessons);
        }

        Ok(Self {
            modules,
            order,
            lessons,
            bosses,
        })
    }

    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Module ids in unlock order.
    pub fn module_order(&self) -> &[String] {
        &self.order
    }

    pub fn module(&self, id: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn require_module(&self, id: &str) -> Result<&ModuleInfo> {
        self.module(id).ok_or_else(|| Error::UnknownModule(id.to_string()))
    }

    /// Lessons of `module` in teaching order; empty for unknown modules.
    pub fn lessons(&self, module: &str) -> &[Exercise] {
        self.lessons.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn boss(&self, module: &str) -> Option<&BossExercise> {
        self.bosses.get(module)
    }

    /// Any lesson or boss step by id.
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.order.iter().find_map(|module| {
            self.lessons(module).iter().find(|ex| ex.id == id).or_else(|| {
                self.boss(module)?
                    .steps
                    .iter()
                    .map(|step| &step.exercise)
                    .find(|ex| ex.id == id)
            })
        })
    }

    pub fn require_exercise(&self, id: &str) -> Result<&Exercise> {
        self.exercise(id).ok_or_else(|| Error::UnknownExercise(id.to_string()))
    }
}

fn stamp(mut ex: Exercise, info: &ModuleInfo, kind: ExerciseKind) -> Exercise {
    ex.module = info.id.clone();
    ex.kind = kind;
    ex.validation = info.validation;
    ex
}

fn check_exercise(ex: &Exercise, seen: &mut HashSet<String>) -> std::result::Result<(), String> {
    if !seen.insert(ex.id.clone()) {
        return Err(format!("duplicate exercise id `{}`", ex.id));
    }
    if ex.solutions.is_empty() {
        return Err(format!("exercise `{}` has no solutions", ex.id));
    }
    if !ex.solutions.contains(&ex.optimal) {
        return Err(format!(
            "exercise `{}`: optimal `{}` is not a listed solution",
            ex.id, ex.optimal
        ));
    }
    Ok(())
}
