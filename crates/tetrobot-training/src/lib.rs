//! Weight tuning for the heuristic agent with a genetic algorithm.
//!
//! An individual is a [`HeuristicWeights`](tetrobot_agent::HeuristicWeights)
//! vector. Its fitness is the mean final score of headless games played by an
//! [`AgentController`](tetrobot_agent::AgentController) using those weights:
//!
//! ```text
//! Population (random weights)
//!     ↓ evaluate_fitness (one thread per individual)
//! FitnessEvaluator ── simulate_game × rounds ──→ mean score
//!     ↓ sorted by fitness
//! PopulationEvolver (elitism, tournament, crossover, mutation)
//!     ↓ next generation
//! ... until TerminationCriteria
//! ```
//!
//! The weight operators live in [`weights`], the loop in [`genetic`].

pub mod genetic;
pub mod weights;
