mod cli;
mod packing;
mod pipeline;
mod reconcile;
