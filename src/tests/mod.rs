mod context;
mod props;
mod scalars;
