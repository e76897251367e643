mod cifar10;
