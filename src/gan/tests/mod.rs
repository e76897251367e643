mod model;
mod trainer;
