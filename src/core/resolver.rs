//! Project environment resolution
//!
//! The resolver enumerates descriptor candidates, feeds each through the
//! [`Recognizer`] one file at a time and folds the results into a
//! [`ProjectEnvironment`]. Every candidate is scanned, even after a match,
//! because the main descriptor and the routes usually live in different
//! files.

use crate::core::descriptor::{Recognized, Recognizer};
use crate::core::error::{AtseError, Result};
use crate::core::models::{
    BasePaths, Config, ProjectEnvironment, ReadFailurePolicy, ScannedSource, SourceOutcome,
};
use crate::core::walker::{normalize_path, CandidateFile, FsProjectSource, ProjectSource};
use std::path::Path;

/// Scans a project and builds its [`ProjectEnvironment`]
pub struct EnvironmentResolver<S: ProjectSource = FsProjectSource> {
    source: S,
    config: Config,
    recognizer: Recognizer,
}

impl EnvironmentResolver<FsProjectSource> {
    /// Resolver reading from the filesystem
    pub fn new(config: Config) -> Self {
        Self::with_source(FsProjectSource::new(), config)
    }
}

impl<S: ProjectSource> EnvironmentResolver<S> {
    /// Resolver reading through a custom source
    pub fn with_source(source: S, config: Config) -> Self {
        let recognizer = Recognizer::new(config.scan_strategy);
        Self {
            source,
            config,
            recognizer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan `root` and return its environment.
    ///
    /// Fails when `root` is not a directory. A project without any matching
    /// candidate is not an error: the returned environment reports
    /// `is_valid_project() == false`.
    pub fn resolve(&self, root: &Path) -> Result<ProjectEnvironment> {
        if !root.is_dir() {
            return Err(AtseError::NoProjectRoot {
                path: root.to_path_buf(),
            });
        }

        let candidates = self.source.candidates(root, &self.config.candidate_glob)?;
        tracing::debug!(
            "scanning {} candidate(s) matching {}",
            candidates.len(),
            self.config.candidate_glob
        );

        let environment = candidates.iter().try_fold(
            ProjectEnvironment::empty(root),
            |mut env, candidate| -> Result<ProjectEnvironment> {
                let outcome = self.scan_candidate(candidate, &mut env)?;
                env.sources.push(ScannedSource {
                    path: candidate.relative.clone(),
                    outcome,
                });
                Ok(env)
            },
        )?;

        if environment.is_valid_project() {
            tracing::info!(
                "recognized project at {} ({} route alias(es))",
                root.display(),
                environment.route_aliases.len()
            );
        } else {
            tracing::info!("no angular-typescript-seed descriptor under {}", root.display());
        }
        Ok(environment)
    }

    /// Read and recognize one candidate, merging what it declares into `env`
    fn scan_candidate(
        &self,
        candidate: &CandidateFile,
        env: &mut ProjectEnvironment,
    ) -> Result<SourceOutcome> {
        if candidate.size > self.config.max_file_size {
            tracing::debug!("skipping {} ({} bytes)", candidate.relative, candidate.size);
            return Ok(SourceOutcome::NoMatch);
        }

        let text = match self.source.read(&candidate.path) {
            Ok(text) => text,
            Err(e) => match self.config.read_failure_policy {
                ReadFailurePolicy::Abort => {
                    return Err(AtseError::ScanAborted {
                        path: candidate.path.clone(),
                        source: e,
                    })
                }
                ReadFailurePolicy::KeepPartial => {
                    tracing::warn!("cannot read {}: {}", candidate.relative, e);
                    return Ok(SourceOutcome::Unreadable {
                        message: e.to_string(),
                    });
                }
            },
        };

        let recognized = match self.recognizer.recognize(&text) {
            Ok(recognized) => recognized,
            Err(e) => {
                tracing::warn!("cannot recognize {}: {}", candidate.relative, e);
                return Ok(SourceOutcome::NoMatch);
            }
        };

        Ok(match recognized {
            Recognized::Main(main) => {
                let paths = BasePaths {
                    controllers: normalize_path(&main.controllers_base_path),
                    views: normalize_path(&main.views_base_path),
                };
                match &env.base_paths {
                    Some(existing) => tracing::warn!(
                        "ignoring AngularApp descriptor in {}: base paths already set ({} / {})",
                        candidate.relative,
                        existing.controllers,
                        existing.views
                    ),
                    None => {
                        tracing::debug!(
                            "base paths from {}: controllers={} views={}",
                            candidate.relative,
                            paths.controllers,
                            paths.views
                        );
                        env.base_paths = Some(paths);
                    }
                }
                SourceOutcome::MainDescriptor
            }
            Recognized::Routes(routes) => {
                let count = routes.len();
                for route in routes {
                    let key = normalize_path(&route.path);
                    if let Some(existing) = env.route_aliases.get(&key) {
                        if *existing != route.alias {
                            tracing::warn!(
                                "route '{}' in {} already aliased as '{}', ignoring '{}'",
                                key,
                                candidate.relative,
                                existing,
                                route.alias
                            );
                        }
                        continue;
                    }
                    env.route_aliases.insert(key, route.alias);
                }
                SourceOutcome::Routes { count }
            }
            Recognized::Nothing => SourceOutcome::NoMatch,
        })
    }
}
